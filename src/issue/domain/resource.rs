//! Declared issue resource: the locally owned desired state.

use super::{ConditionSet, IssueDomainError, ResourceKey, ResourceUid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Finalizer guarding declared issues until the remote issue is closed.
pub const CLOSE_ISSUE_FINALIZER: &str = "issues.dvir.io/finalizer";

/// Store metadata of a declared issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Namespace and name.
    #[serde(flatten)]
    pub key: ResourceKey,
    /// Identifier assigned at creation.
    pub uid: ResourceUid,
    /// Optimistic concurrency token, bumped by the store on every write.
    #[serde(default)]
    pub resource_version: u64,
    /// Deletion guards that must be cleared before removal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
    /// Set when removal has been requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
}

/// Desired state of a remote issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubIssueSpec {
    /// URL of the repository hosting the issue.
    pub repo: String,
    /// Issue title, used to find the remote issue.
    pub title: String,
    /// Issue body.
    #[serde(default)]
    pub description: String,
}

impl GithubIssueSpec {
    /// Creates a validated spec.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::EmptyTitle`] when the title is blank.
    pub fn new(
        repo: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, IssueDomainError> {
        let raw_title = title.into();
        if raw_title.trim().is_empty() {
            return Err(IssueDomainError::EmptyTitle);
        }
        Ok(Self {
            repo: repo.into(),
            title: raw_title,
            description: description.into(),
        })
    }
}

/// Observed state of a remote issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubIssueStatus {
    /// Projected conditions.
    #[serde(default)]
    pub conditions: ConditionSet,
}

/// Declared issue resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubIssue {
    /// Store metadata.
    pub metadata: ObjectMeta,
    /// Desired state.
    pub spec: GithubIssueSpec,
    /// Observed state.
    #[serde(default)]
    pub status: GithubIssueStatus,
}

impl GithubIssue {
    /// Creates a fresh resource with empty status and no finalizers.
    #[must_use]
    pub fn new(key: ResourceKey, spec: GithubIssueSpec) -> Self {
        Self {
            metadata: ObjectMeta {
                key,
                uid: ResourceUid::new(),
                resource_version: 0,
                finalizers: Vec::new(),
                deletion_timestamp: None,
            },
            spec,
            status: GithubIssueStatus::default(),
        }
    }

    /// Returns the store identity.
    #[must_use]
    pub const fn key(&self) -> &ResourceKey {
        &self.metadata.key
    }

    /// Returns `true` when removal has been requested.
    #[must_use]
    pub const fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Returns `true` when `finalizer` is present.
    #[must_use]
    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.metadata.finalizers.iter().any(|entry| entry == finalizer)
    }

    /// Adds `finalizer` unless already present. Returns whether it was added.
    pub fn add_finalizer(&mut self, finalizer: &str) -> bool {
        if self.has_finalizer(finalizer) {
            return false;
        }
        self.metadata.finalizers.push(finalizer.to_owned());
        true
    }

    /// Removes every copy of `finalizer`. Returns whether any was removed.
    pub fn remove_finalizer(&mut self, finalizer: &str) -> bool {
        let before = self.metadata.finalizers.len();
        self.metadata.finalizers.retain(|entry| entry != finalizer);
        self.metadata.finalizers.len() != before
    }

    /// Returns the projected conditions.
    #[must_use]
    pub const fn conditions(&self) -> &ConditionSet {
        &self.status.conditions
    }
}
