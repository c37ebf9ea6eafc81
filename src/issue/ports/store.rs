//! Resource store port for declared issues.

use crate::issue::domain::{GithubIssue, ResourceKey};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for resource store operations.
pub type ResourceStoreResult<T> = Result<T, ResourceStoreError>;

/// Declared issue persistence contract.
///
/// Writes are read-modify-write against `metadata.resource_version`: a write
/// carrying a version other than the stored one fails with
/// [`ResourceStoreError::Conflict`]. Successful writes return the stored copy
/// with its new version.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetches a declared issue. Returns `None` when it does not exist.
    async fn get(&self, key: &ResourceKey) -> ResourceStoreResult<Option<GithubIssue>>;

    /// Persists metadata and spec. The status in `resource` is ignored.
    ///
    /// A resource whose deletion was requested and whose finalizers are all
    /// cleared is removed by this write.
    async fn update(&self, resource: &GithubIssue) -> ResourceStoreResult<GithubIssue>;

    /// Persists only the status subresource.
    async fn update_status(&self, resource: &GithubIssue) -> ResourceStoreResult<GithubIssue>;
}

/// Errors returned by resource store implementations.
#[derive(Debug, Clone, Error)]
pub enum ResourceStoreError {
    /// The resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(ResourceKey),

    /// The resource changed since it was read.
    #[error("conflicting write to {key}: expected version {expected}, stored version {actual}")]
    Conflict {
        /// Resource identity.
        key: ResourceKey,
        /// Version carried by the write.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ResourceStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
