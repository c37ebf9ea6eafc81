//! Issue tracker port for listing and mutating remote issues.

use crate::issue::domain::{
    IssueEdit, IssueNumber, NewIssue, RemoteIssue, RepositoryRef, TimelineEvent,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for issue tracker operations.
pub type IssueTrackerResult<T> = Result<T, IssueTrackerError>;

/// Remote issue tracker contract.
///
/// Implementations own transport, authentication, and pagination. They do
/// not retry; every failure is reported to the caller.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Lists every issue in the repository, in the order the tracker returns
    /// them.
    async fn list_issues(&self, repository: &RepositoryRef)
    -> IssueTrackerResult<Vec<RemoteIssue>>;

    /// Creates an issue.
    async fn create_issue(
        &self,
        repository: &RepositoryRef,
        issue: &NewIssue,
    ) -> IssueTrackerResult<RemoteIssue>;

    /// Applies a partial edit to an existing issue.
    async fn edit_issue(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
        edit: &IssueEdit,
    ) -> IssueTrackerResult<RemoteIssue>;

    /// Returns the issue timeline ordered oldest to newest.
    async fn list_timeline(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
    ) -> IssueTrackerResult<Vec<TimelineEvent>>;
}

/// Errors returned by issue tracker adapters.
#[derive(Debug, Clone, Error)]
pub enum IssueTrackerError {
    /// The tracker answered with a non-success status.
    #[error("{operation} failed with status {status}: {message}")]
    Rejected {
        /// Operation name.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Response detail.
        message: String,
    },

    /// The tracker response could not be decoded.
    #[error("{operation} returned an undecodable response: {cause}")]
    Decode {
        /// Operation name.
        operation: String,
        /// Decoder failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The request did not complete.
    #[error("issue tracker transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl IssueTrackerError {
    /// Builds a rejection error.
    pub fn rejected(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    /// Wraps a decoding error.
    pub fn decode(
        operation: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Decode {
            operation: operation.into(),
            cause: Arc::new(err),
        }
    }

    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Returns the HTTP status when the tracker rejected the request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Decode { .. } | Self::Transport(_) => None,
        }
    }
}
