//! Shared test helpers for in-memory reconciliation integration tests.

use issue_reconciler::issue::{
    adapters::memory::{InMemoryIssueTracker, InMemoryResourceStore, TrackerOperation},
    domain::{GithubIssue, GithubIssueSpec, RepositoryRef, ResourceKey},
    ports::ResourceStore,
    services::IssueReconciler,
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Repository URL used by declared issues in these tests.
pub const REPO_URL: &str = "https://github.com/acme/platform";

/// Reconciler type under test.
pub type TestReconciler =
    IssueReconciler<InMemoryIssueTracker, InMemoryResourceStore, DefaultClock>;

/// Reconciler together with the adapters it was built from.
pub struct Setup {
    pub tracker: Arc<InMemoryIssueTracker>,
    pub store: Arc<InMemoryResourceStore>,
    pub reconciler: TestReconciler,
}

impl Setup {
    /// Stores a declared issue named `name` and returns its key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key, spec, or store write is rejected.
    pub fn declare(
        &self,
        name: &str,
        title: &str,
        description: &str,
    ) -> Result<ResourceKey, eyre::Report> {
        let key = ResourceKey::new("default", name)?;
        let spec = GithubIssueSpec::new(REPO_URL, title, description)?;
        self.store.insert(GithubIssue::new(key.clone(), spec))?;
        Ok(key)
    }

    /// Fetches the stored resource for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the resource is gone.
    pub async fn fetch(&self, key: &ResourceKey) -> Result<GithubIssue, eyre::Report> {
        self.store
            .get(key)
            .await?
            .ok_or_else(|| eyre::eyre!("resource {key} missing from store"))
    }

    /// Returns how many times `operation` reached the tracker.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker state cannot be read.
    pub fn calls(&self, operation: TrackerOperation) -> Result<usize, eyre::Report> {
        Ok(self.tracker.call_count(operation)?)
    }
}

/// Provides the repository addressed by [`REPO_URL`].
///
/// # Panics
///
/// Panics if the constant URL stops resolving.
#[fixture]
pub fn repository() -> RepositoryRef {
    RepositoryRef::from_url(REPO_URL).expect("constant repository URL resolves")
}

/// Provides a reconciler over fresh in-memory adapters.
#[fixture]
pub fn setup() -> Setup {
    let tracker = Arc::new(InMemoryIssueTracker::new());
    let store = Arc::new(InMemoryResourceStore::new());
    let reconciler = IssueReconciler::new(
        Arc::clone(&tracker),
        Arc::clone(&store),
        Arc::new(DefaultClock),
    );
    Setup {
        tracker,
        store,
        reconciler,
    }
}
