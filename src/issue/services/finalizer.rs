//! Idempotent management of the reconciler's deletion guard.

use crate::issue::{
    domain::GithubIssue,
    ports::{ResourceStore, ResourceStoreResult},
};
use std::sync::Arc;

/// Adds and removes the reconciler's finalizer, persisting each change.
///
/// On a persisted change the caller's resource is replaced by the stored
/// copy, so later writes in the same invocation carry the new version.
#[derive(Clone)]
pub struct FinalizerManager<S>
where
    S: ResourceStore,
{
    store: Arc<S>,
    finalizer: String,
}

impl<S> FinalizerManager<S>
where
    S: ResourceStore,
{
    /// Creates a manager for `finalizer`.
    #[must_use]
    pub fn new(store: Arc<S>, finalizer: impl Into<String>) -> Self {
        Self {
            store,
            finalizer: finalizer.into(),
        }
    }

    /// Returns the managed finalizer name.
    #[must_use]
    pub fn finalizer(&self) -> &str {
        &self.finalizer
    }

    /// Adds the finalizer when absent. Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns the store error when the write fails; `resource` is left
    /// unchanged in that case.
    pub async fn add(&self, resource: &mut GithubIssue) -> ResourceStoreResult<bool> {
        if resource.has_finalizer(&self.finalizer) {
            return Ok(false);
        }

        let mut desired = resource.clone();
        desired.add_finalizer(&self.finalizer);
        *resource = self.store.update(&desired).await?;
        tracing::info!(finalizer = %self.finalizer, "added finalizer");
        Ok(true)
    }

    /// Removes the finalizer when present. Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns the store error when the write fails; `resource` is left
    /// unchanged in that case.
    pub async fn remove(&self, resource: &mut GithubIssue) -> ResourceStoreResult<bool> {
        if !resource.has_finalizer(&self.finalizer) {
            return Ok(false);
        }

        let mut desired = resource.clone();
        desired.remove_finalizer(&self.finalizer);
        *resource = self.store.update(&desired).await?;
        tracing::info!(finalizer = %self.finalizer, "removed finalizer");
        Ok(true)
    }
}
