//! Reconciliation of declared issues against the remote tracker.
//!
//! One call to [`IssueReconciler::reconcile`] performs a single pass for one
//! resource: read the declared issue, resolve its repository, list remote
//! issues, match by title, then close, create, or update the remote issue and
//! project what was observed into the status conditions. Nothing is cached
//! between passes.

use super::FinalizerManager;
use crate::{
    config::ReconcilerConfig,
    issue::{
        domain::{
            ConditionUpdate, GithubIssue, IssueDomainError, IssueEdit, NewIssue, RemoteIssue,
            RepositoryRef, ResourceKey, StatusProjector, find_matching_issue,
        },
        ports::{IssueTracker, IssueTrackerError, ResourceStore, ResourceStoreError},
    },
};
use mockable::Clock;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Successful end of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    requeue_after: Option<Duration>,
}

impl ReconcileOutcome {
    /// Nothing further to do for this resource.
    #[must_use]
    pub const fn done() -> Self {
        Self {
            requeue_after: None,
        }
    }

    /// Invoke again after `delay` to correct drift.
    #[must_use]
    pub const fn requeue_after(delay: Duration) -> Self {
        Self {
            requeue_after: Some(delay),
        }
    }

    /// Returns the requested delay before the next pass, if any.
    #[must_use]
    pub const fn requeue_delay(&self) -> Option<Duration> {
        self.requeue_after
    }
}

/// Failures surfaced to the scheduler.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The declared repository URL cannot be resolved. Retrying without a
    /// spec change will not help.
    #[error(transparent)]
    InvalidRepoUrl(IssueDomainError),

    /// The issue tracker call failed.
    #[error("remote API error: {0}")]
    RemoteApi(#[from] IssueTrackerError),

    /// Deletion was requested but there is no remote issue to close.
    #[error("deletion of {key} requested but no issue titled '{title}' exists in {repository}")]
    DanglingDeletion {
        /// Declared issue identity.
        key: ResourceKey,
        /// Declared title that found no match.
        title: String,
        /// Repository that was searched.
        repository: RepositoryRef,
    },

    /// A status or finalizer write raced with another writer.
    #[error("persistence conflict: {0}")]
    PersistenceConflict(ResourceStoreError),

    /// Any other store failure.
    #[error(transparent)]
    Store(ResourceStoreError),
}

impl From<ResourceStoreError> for ReconcileError {
    fn from(err: ResourceStoreError) -> Self {
        match err {
            ResourceStoreError::Conflict { .. } => Self::PersistenceConflict(err),
            ResourceStoreError::NotFound(_) | ResourceStoreError::Persistence(_) => {
                Self::Store(err)
            }
        }
    }
}

impl ReconcileError {
    /// Returns `true` when retrying without a spec change cannot succeed.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::InvalidRepoUrl(_))
    }
}

/// Result type for reconciliation passes.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Reconciles declared issues with remote issues.
#[derive(Clone)]
pub struct IssueReconciler<T, S, C>
where
    T: IssueTracker,
    S: ResourceStore,
    C: Clock + Send + Sync,
{
    tracker: Arc<T>,
    store: Arc<S>,
    clock: Arc<C>,
    finalizers: FinalizerManager<S>,
    config: ReconcilerConfig,
}

impl<T, S, C> IssueReconciler<T, S, C>
where
    T: IssueTracker,
    S: ResourceStore,
    C: Clock + Send + Sync,
{
    /// Creates a reconciler with default configuration.
    #[must_use]
    pub fn new(tracker: Arc<T>, store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_config(tracker, store, clock, ReconcilerConfig::default())
    }

    /// Creates a reconciler with explicit configuration.
    #[must_use]
    pub fn with_config(
        tracker: Arc<T>,
        store: Arc<S>,
        clock: Arc<C>,
        config: ReconcilerConfig,
    ) -> Self {
        let finalizers = FinalizerManager::new(Arc::clone(&store), config.finalizer.clone());
        Self {
            tracker,
            store,
            clock,
            finalizers,
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Runs one reconciliation pass for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidRepoUrl`] for an unresolvable
    /// repository, [`ReconcileError::RemoteApi`] when a tracker call fails,
    /// [`ReconcileError::DanglingDeletion`] when deletion finds nothing to
    /// close, and [`ReconcileError::PersistenceConflict`] or
    /// [`ReconcileError::Store`] when a local write fails.
    #[tracing::instrument(skip(self, key), fields(resource = %key))]
    pub async fn reconcile(&self, key: &ResourceKey) -> ReconcileResult<ReconcileOutcome> {
        let Some(mut resource) = self.store.get(key).await? else {
            debug!("declared issue no longer exists");
            return Ok(ReconcileOutcome::done());
        };

        if resource.is_being_deleted() && !resource.has_finalizer(self.finalizers.finalizer()) {
            debug!("deletion pending and finalizer already cleared");
            return Ok(ReconcileOutcome::done());
        }

        let repository =
            RepositoryRef::from_url_on_host(&resource.spec.repo, &self.config.repository_host)
                .map_err(|err| {
                    warn!(error = %err, "declared repository URL is invalid");
                    ReconcileError::InvalidRepoUrl(err)
                })?;

        debug!(%repository, "listing remote issues");
        let issues = self.tracker.list_issues(&repository).await?;
        let matched = find_matching_issue(&resource.spec.title, &issues).cloned();

        if resource.is_being_deleted() {
            return self.finalize(resource, &repository, matched).await;
        }

        self.finalizers.add(&mut resource).await?;

        match matched {
            None => self.create(resource, &repository).await,
            Some(issue) => self.sync_existing(resource, &repository, &issue).await,
        }
    }

    async fn finalize(
        &self,
        mut resource: GithubIssue,
        repository: &RepositoryRef,
        matched: Option<RemoteIssue>,
    ) -> ReconcileResult<ReconcileOutcome> {
        let Some(issue) = matched else {
            warn!(%repository, "deletion requested but no matching remote issue exists");
            return Err(ReconcileError::DanglingDeletion {
                key: resource.key().clone(),
                title: resource.spec.title,
                repository: repository.clone(),
            });
        };

        info!(number = %issue.number(), "closing remote issue");
        self.tracker
            .edit_issue(repository, issue.number(), &IssueEdit::close())
            .await?;
        self.finalizers.remove(&mut resource).await?;
        Ok(ReconcileOutcome::done())
    }

    async fn create(
        &self,
        mut resource: GithubIssue,
        repository: &RepositoryRef,
    ) -> ReconcileResult<ReconcileOutcome> {
        let request = NewIssue {
            title: resource.spec.title.clone(),
            body: resource.spec.description.clone(),
        };

        info!(%repository, "creating remote issue");
        match self.tracker.create_issue(repository, &request).await {
            Ok(created) => {
                info!(number = %created.number(), "created remote issue");
                self.persist_conditions(
                    &mut resource,
                    [
                        StatusProjector::is_open(created.state()),
                        StatusProjector::no_pull_request(),
                    ],
                )
                .await?;
                Ok(self.requeue())
            }
            Err(err) => {
                warn!(error = %err, "failed to create remote issue");
                self.persist_after_failure(
                    &mut resource,
                    [
                        StatusProjector::creation_failed(&err.to_string()),
                        StatusProjector::no_pull_request(),
                    ],
                )
                .await;
                Err(err.into())
            }
        }
    }

    async fn sync_existing(
        &self,
        mut resource: GithubIssue,
        repository: &RepositoryRef,
        issue: &RemoteIssue,
    ) -> ReconcileResult<ReconcileOutcome> {
        let mut observed = issue.clone();

        if issue.body_differs_from(&resource.spec.description) {
            info!(number = %issue.number(), "updating remote issue body");
            let edit = IssueEdit::body(resource.spec.description.clone());
            match self.tracker.edit_issue(repository, issue.number(), &edit).await {
                Ok(edited) => observed = edited,
                Err(err) => {
                    warn!(error = %err, "failed to update remote issue body");
                    self.persist_after_failure(
                        &mut resource,
                        [StatusProjector::is_open(issue.state())],
                    )
                    .await;
                    return Err(err.into());
                }
            }
        }

        let timeline = match self
            .tracker
            .list_timeline(repository, observed.number())
            .await
        {
            Ok(timeline) => timeline,
            Err(err) => {
                warn!(
                    error = %err,
                    "failed to fetch issue timeline, keeping last known pull request condition"
                );
                self.persist_conditions(
                    &mut resource,
                    [StatusProjector::is_open(observed.state())],
                )
                .await?;
                return Ok(self.requeue());
            }
        };

        self.persist_conditions(&mut resource, StatusProjector::project(&observed, &timeline))
            .await?;
        Ok(self.requeue())
    }

    /// Merges `updates` and writes the status only when a value changed.
    async fn persist_conditions(
        &self,
        resource: &mut GithubIssue,
        updates: impl IntoIterator<Item = ConditionUpdate> + Send,
    ) -> ReconcileResult<bool> {
        let changed = resource
            .status
            .conditions
            .apply(updates, self.clock.utc());
        if !changed {
            debug!("conditions unchanged, skipping status write");
            return Ok(false);
        }

        *resource = self.store.update_status(resource).await?;
        info!("updated issue status");
        Ok(true)
    }

    /// Status write on an error path; the primary error takes precedence.
    async fn persist_after_failure(
        &self,
        resource: &mut GithubIssue,
        updates: impl IntoIterator<Item = ConditionUpdate> + Send,
    ) {
        if let Err(err) = self.persist_conditions(resource, updates).await {
            warn!(error = %err, "failed to record failure in issue status");
        }
    }

    const fn requeue(&self) -> ReconcileOutcome {
        ReconcileOutcome::requeue_after(self.config.resync_interval)
    }
}
