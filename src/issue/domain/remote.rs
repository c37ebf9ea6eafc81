//! Remote issue snapshots as observed on the issue tracker.

use super::IssueNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open/closed state reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RemoteIssueState {
    /// The issue is open.
    Open,
    /// The issue is closed.
    Closed,
    /// A state this crate does not model, kept verbatim.
    Other(String),
}

impl RemoteIssueState {
    /// Returns the tracker's wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Other(state) => state,
        }
    }

    /// Returns `true` for the open state.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl From<&str> for RemoteIssueState {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            _ => Self::Other(value.trim().to_owned()),
        }
    }
}

impl From<String> for RemoteIssueState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<RemoteIssueState> for String {
    fn from(value: RemoteIssueState) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for RemoteIssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direct pull request linkage carried on a remote issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestLink {
    /// Browser URL of the pull request, when reported.
    pub html_url: Option<String>,
}

/// Issue as returned by the tracker's list, create, and edit calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIssue {
    id: u64,
    number: IssueNumber,
    title: String,
    body: Option<String>,
    state: RemoteIssueState,
    pull_request: Option<PullRequestLink>,
}

impl RemoteIssue {
    /// Creates an issue snapshot with no body and no pull request link.
    #[must_use]
    pub fn new(
        id: u64,
        number: IssueNumber,
        title: impl Into<String>,
        state: RemoteIssueState,
    ) -> Self {
        Self {
            id,
            number,
            title: title.into(),
            body: None,
            state,
            pull_request: None,
        }
    }

    /// Sets the issue body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the direct pull request link.
    #[must_use]
    pub fn with_pull_request(mut self, link: PullRequestLink) -> Self {
        self.pull_request = Some(link);
        self
    }

    /// Sets the issue state.
    #[must_use]
    pub fn with_state(mut self, state: RemoteIssueState) -> Self {
        self.state = state;
        self
    }

    /// Returns the tracker-wide identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the per-repository issue number.
    #[must_use]
    pub const fn number(&self) -> IssueNumber {
        self.number
    }

    /// Returns the issue title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the issue body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the issue state.
    #[must_use]
    pub const fn state(&self) -> &RemoteIssueState {
        &self.state
    }

    /// Returns the direct pull request link, if any.
    #[must_use]
    pub const fn pull_request(&self) -> Option<&PullRequestLink> {
        self.pull_request.as_ref()
    }

    /// Returns `true` when the body differs from `description`.
    ///
    /// A missing body compares equal to an empty description.
    #[must_use]
    pub fn body_differs_from(&self, description: &str) -> bool {
        self.body.as_deref().unwrap_or_default() != description
    }
}

/// Kind of a timeline event relevant to pull request linkage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TimelineEventKind {
    /// A pull request was connected to the issue.
    Connected,
    /// The issue was referenced from a pull request or another issue.
    CrossReferenced,
    /// A previously connected pull request was disconnected.
    Disconnected,
    /// Any other event, kept by name.
    Other(String),
}

impl TimelineEventKind {
    /// Returns the tracker's event name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connected => "connected",
            Self::CrossReferenced => "cross-referenced",
            Self::Disconnected => "disconnected",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for TimelineEventKind {
    fn from(value: &str) -> Self {
        match value {
            "connected" => Self::Connected,
            "cross-referenced" => Self::CrossReferenced,
            "disconnected" => Self::Disconnected,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for TimelineEventKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<TimelineEventKind> for String {
    fn from(value: TimelineEventKind) -> Self {
        value.as_str().to_owned()
    }
}

/// Single entry of an issue timeline, ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Event kind.
    pub kind: TimelineEventKind,
    /// When the event happened, if the tracker reports it.
    pub created_at: Option<DateTime<Utc>>,
}

impl TimelineEvent {
    /// Creates an undated event of the given kind.
    #[must_use]
    pub const fn new(kind: TimelineEventKind) -> Self {
        Self {
            kind,
            created_at: None,
        }
    }
}

/// Payload for creating a remote issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: String,
}

/// Partial update applied to an existing remote issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueEdit {
    /// Replacement body, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Replacement state, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<RemoteIssueState>,
}

impl IssueEdit {
    /// Edit replacing only the body.
    #[must_use]
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            state: None,
        }
    }

    /// Edit closing the issue.
    #[must_use]
    pub const fn close() -> Self {
        Self {
            body: None,
            state: Some(RemoteIssueState::Closed),
        }
    }
}

/// Returns the first issue whose title equals `title`, ignoring case.
///
/// Matching is exact after case folding: `"Bug"` matches `"bug"` but not
/// `"Bug report"`. When several issues match, the earliest in `issues` wins.
#[must_use]
pub fn find_matching_issue<'a>(title: &str, issues: &'a [RemoteIssue]) -> Option<&'a RemoteIssue> {
    let wanted = title.to_lowercase();
    issues
        .iter()
        .find(|issue| issue.title().to_lowercase() == wanted)
}
