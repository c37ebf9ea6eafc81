//! Identifier and validated scalar types for the issue domain.

use super::IssueDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Store identity of a declared issue resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    namespace: String,
    name: String,
}

impl ResourceKey {
    /// Creates a validated resource key.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::InvalidResourceKey`] when either segment is
    /// empty, contains whitespace, or contains a slash.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, IssueDomainError> {
        let raw_namespace = namespace.into();
        let raw_name = name.into();
        let is_valid_segment = |segment: &str| {
            !segment.is_empty()
                && !segment.contains('/')
                && !segment.chars().any(char::is_whitespace)
        };

        if !is_valid_segment(&raw_namespace) || !is_valid_segment(&raw_name) {
            return Err(IssueDomainError::InvalidResourceKey(format!(
                "{raw_namespace}/{raw_name}"
            )));
        }

        Ok(Self {
            namespace: raw_namespace,
            name: raw_name,
        })
    }

    /// Returns the namespace segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Unique identifier assigned to a resource when it is first created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceUid(Uuid);

impl ResourceUid {
    /// Creates a new random resource identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ResourceUid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Positive issue number assigned by the remote tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(u64);

impl IssueNumber {
    /// Creates a validated issue number.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::InvalidIssueNumber`] when the value is zero.
    pub const fn new(value: u64) -> Result<Self, IssueDomainError> {
        if value == 0 {
            return Err(IssueDomainError::InvalidIssueNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
