//! Repository identity resolution from declared repository URLs.

use super::IssueDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Host serving the repositories addressed by declared issues.
pub const GITHUB_HOST: &str = "github.com";

/// Owner and repository pair identifying a remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Creates a repository reference from owner and repository segments.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::InvalidRepoUrl`] when either segment is
    /// empty or contains characters outside `[A-Za-z0-9_.-]`.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, IssueDomainError> {
        let raw_owner = owner.into();
        let raw_name = name.into();
        if !is_valid_segment(&raw_owner) || !is_valid_segment(&raw_name) {
            return Err(IssueDomainError::invalid_repo_url(
                &format!("{raw_owner}/{raw_name}"),
                "owner and repository may only use letters, digits, '_', '-' or '.'",
            ));
        }
        Ok(Self {
            owner: raw_owner,
            name: raw_name,
        })
    }

    /// Resolves a `https://github.com/<owner>/<repo>` URL.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::InvalidRepoUrl`] when the URL is malformed,
    /// is not `https`, points at another host, or lacks owner and repository
    /// segments.
    pub fn from_url(raw: &str) -> Result<Self, IssueDomainError> {
        Self::from_url_on_host(raw, GITHUB_HOST)
    }

    /// Resolves a repository URL served by `host`.
    ///
    /// Trailing path segments after the repository (for example `/issues`)
    /// and a `.git` suffix on the repository segment are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::InvalidRepoUrl`] under the same conditions
    /// as [`RepositoryRef::from_url`].
    pub fn from_url_on_host(raw: &str, host: &str) -> Result<Self, IssueDomainError> {
        let parsed = Url::parse(raw.trim())
            .map_err(|err| IssueDomainError::invalid_repo_url(raw, err.to_string()))?;

        if parsed.scheme() != "https" {
            return Err(IssueDomainError::invalid_repo_url(
                raw,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        let actual_host = parsed.host_str().unwrap_or_default();
        if !actual_host.eq_ignore_ascii_case(host) {
            return Err(IssueDomainError::invalid_repo_url(
                raw,
                format!("expected host '{host}', found '{actual_host}'"),
            ));
        }

        let mut segments = parsed.path_segments().into_iter().flatten();
        let owner = segments.next().unwrap_or_default();
        let repo_segment = segments.next().unwrap_or_default();
        let repo = repo_segment.strip_suffix(".git").unwrap_or(repo_segment);
        if owner.is_empty() || repo.is_empty() {
            return Err(IssueDomainError::invalid_repo_url(
                raw,
                "missing owner or repository segment",
            ));
        }

        Self::new(owner, repo)
            .map_err(|_| IssueDomainError::invalid_repo_url(raw, "malformed owner or repository"))
    }

    /// Returns the repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
