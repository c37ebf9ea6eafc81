//! Error types for issue domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain issue values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IssueDomainError {
    /// The repository URL does not address a repository on the tracker host.
    #[error("invalid repository URL '{url}': {reason}")]
    InvalidRepoUrl {
        /// The rejected URL as declared.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// The declared issue title is empty after trimming.
    #[error("issue title must not be empty")]
    EmptyTitle,

    /// The resource namespace or name is empty or malformed.
    #[error("invalid resource key '{0}', expected namespace/name")]
    InvalidResourceKey(String),

    /// The issue number is invalid.
    #[error("invalid issue number {0}, expected a positive integer")]
    InvalidIssueNumber(u64),
}

impl IssueDomainError {
    pub(crate) fn invalid_repo_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRepoUrl {
            url: url.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Error returned while parsing condition values from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown condition value: {0}")]
pub struct ParseConditionError(pub String);
