//! Shared world state for declared issue reconciliation scenarios.

use std::sync::Arc;

use issue_reconciler::issue::{
    adapters::memory::{InMemoryIssueTracker, InMemoryResourceStore},
    domain::{RepositoryRef, ResourceKey},
    services::{IssueReconciler, ReconcileOutcome, ReconcileResult},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Reconciler type used by the BDD world.
pub type TestReconciler =
    IssueReconciler<InMemoryIssueTracker, InMemoryResourceStore, DefaultClock>;

/// Scenario world for reconciliation behaviour tests.
pub struct ReconcileWorld {
    pub tracker: Arc<InMemoryIssueTracker>,
    pub store: Arc<InMemoryResourceStore>,
    pub reconciler: TestReconciler,
    pub key: Option<ResourceKey>,
    pub repo_url: Option<String>,
    pub last_result: Option<ReconcileResult<ReconcileOutcome>>,
}

impl ReconcileWorld {
    /// Creates a world with empty adapters and no declared issue.
    #[must_use]
    pub fn new() -> Self {
        let tracker = Arc::new(InMemoryIssueTracker::new());
        let store = Arc::new(InMemoryResourceStore::new());
        let reconciler = IssueReconciler::new(
            Arc::clone(&tracker),
            Arc::clone(&store),
            Arc::new(DefaultClock),
        );
        Self {
            tracker,
            store,
            reconciler,
            key: None,
            repo_url: None,
            last_result: None,
        }
    }

    /// Returns the key of the declared issue.
    ///
    /// # Errors
    ///
    /// Returns an error if no issue has been declared yet.
    pub fn key(&self) -> Result<ResourceKey, eyre::Report> {
        self.key
            .clone()
            .ok_or_else(|| eyre::eyre!("missing declared issue in scenario world"))
    }

    /// Resolves the declared repository URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no issue has been declared or the URL is invalid.
    pub fn repository(&self) -> Result<RepositoryRef, eyre::Report> {
        let url = self
            .repo_url
            .as_deref()
            .ok_or_else(|| eyre::eyre!("missing repository URL in scenario world"))?;
        Ok(RepositoryRef::from_url(url)?)
    }
}

impl Default for ReconcileWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ReconcileWorld {
    ReconcileWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
