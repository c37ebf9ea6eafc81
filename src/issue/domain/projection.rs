//! Projection of remote issue state onto local conditions.
//!
//! `IsOpen` mirrors the remote open/closed state. `HasPR` prefers the direct
//! pull request link on the issue and falls back to the timeline, scanned from
//! newest to oldest so that a later disconnect overrides an earlier connect.

use super::{
    ConditionStatus, ConditionType, ConditionUpdate, RemoteIssue, RemoteIssueState, TimelineEvent,
    TimelineEventKind,
};

/// Builds condition updates from observed remote data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusProjector;

impl StatusProjector {
    /// `IsOpen` for the given remote state.
    #[must_use]
    pub fn is_open(state: &RemoteIssueState) -> ConditionUpdate {
        if state.is_open() {
            return ConditionUpdate::new(
                ConditionType::IsOpen,
                ConditionStatus::True,
                "issue is open",
                "the remote issue is open",
            );
        }
        ConditionUpdate::new(
            ConditionType::IsOpen,
            ConditionStatus::False,
            format!("issue is {state}"),
            format!("the remote issue is {state}"),
        )
    }

    /// `IsOpen=False` after the remote issue could not be created.
    #[must_use]
    pub fn creation_failed(error: &str) -> ConditionUpdate {
        ConditionUpdate::new(
            ConditionType::IsOpen,
            ConditionStatus::False,
            "issue creation failed",
            error,
        )
    }

    /// `HasPR=False` without consulting remote data.
    #[must_use]
    pub fn no_pull_request() -> ConditionUpdate {
        ConditionUpdate::new(
            ConditionType::HasPr,
            ConditionStatus::False,
            "issue has no pull request",
            "no pull request is linked to the issue",
        )
    }

    /// `HasPR` from the issue's direct link, falling back to its timeline.
    #[must_use]
    pub fn has_pull_request(issue: &RemoteIssue, timeline: &[TimelineEvent]) -> ConditionUpdate {
        if let Some(link) = issue.pull_request() {
            let message = link.html_url.as_deref().map_or_else(
                || "the issue carries a pull request link".to_owned(),
                |url| format!("linked pull request {url}"),
            );
            return ConditionUpdate::new(
                ConditionType::HasPr,
                ConditionStatus::True,
                "issue has a linked pull request",
                message,
            );
        }

        match latest_pull_request_event(timeline) {
            Some(kind) if connects(kind) => ConditionUpdate::new(
                ConditionType::HasPr,
                ConditionStatus::True,
                "pull request connected",
                format!("latest pull request event is {}", kind.as_str()),
            ),
            _ => Self::no_pull_request(),
        }
    }

    /// Both conditions for a remote issue and its timeline.
    #[must_use]
    pub fn project(issue: &RemoteIssue, timeline: &[TimelineEvent]) -> [ConditionUpdate; 2] {
        [
            Self::is_open(issue.state()),
            Self::has_pull_request(issue, timeline),
        ]
    }
}

const fn connects(kind: &TimelineEventKind) -> bool {
    matches!(
        kind,
        TimelineEventKind::Connected | TimelineEventKind::CrossReferenced
    )
}

/// Newest event that links or unlinks a pull request.
fn latest_pull_request_event(timeline: &[TimelineEvent]) -> Option<&TimelineEventKind> {
    timeline
        .iter()
        .rev()
        .map(|event| &event.kind)
        .find(|kind| connects(kind) || matches!(kind, TimelineEventKind::Disconnected))
}

/// Timeline-only `HasPR` decision.
#[must_use]
pub fn timeline_has_pull_request(timeline: &[TimelineEvent]) -> bool {
    latest_pull_request_event(timeline).is_some_and(connects)
}
