//! Domain model for declared issue reconciliation.
//!
//! The issue domain covers repository identity, remote issue snapshots and
//! matching, typed status conditions, and the declared resource itself. All
//! infrastructure concerns stay outside of the domain boundary.

mod condition;
mod error;
mod ids;
mod projection;
mod remote;
mod repository;
mod resource;

pub use condition::{Condition, ConditionSet, ConditionStatus, ConditionType, ConditionUpdate};
pub use error::{IssueDomainError, ParseConditionError};
pub use ids::{IssueNumber, ResourceKey, ResourceUid};
pub use projection::{StatusProjector, timeline_has_pull_request};
pub use remote::{
    IssueEdit, NewIssue, PullRequestLink, RemoteIssue, RemoteIssueState, TimelineEvent,
    TimelineEventKind, find_matching_issue,
};
pub use repository::{GITHUB_HOST, RepositoryRef};
pub use resource::{
    CLOSE_ISSUE_FINALIZER, GithubIssue, GithubIssueSpec, GithubIssueStatus, ObjectMeta,
};
