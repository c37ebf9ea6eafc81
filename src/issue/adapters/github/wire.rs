//! GitHub REST payloads and their conversion into domain values.

use crate::issue::{
    domain::{
        IssueNumber, PullRequestLink, RemoteIssue, RemoteIssueState, TimelineEvent,
        TimelineEventKind,
    },
    ports::{IssueTrackerError, IssueTrackerResult},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(super) struct IssuePayload {
    id: u64,
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Clone, Deserialize)]
struct PullRequestPayload {
    #[serde(default)]
    html_url: Option<String>,
}

impl IssuePayload {
    pub(super) fn into_remote(self, operation: &str) -> IssueTrackerResult<RemoteIssue> {
        let number =
            IssueNumber::new(self.number).map_err(|err| IssueTrackerError::decode(operation, err))?;
        let mut issue = RemoteIssue::new(
            self.id,
            number,
            self.title,
            RemoteIssueState::from(self.state),
        );
        if let Some(body) = self.body {
            issue = issue.with_body(body);
        }
        if let Some(pull_request) = self.pull_request {
            issue = issue.with_pull_request(PullRequestLink {
                html_url: pull_request.html_url,
            });
        }
        Ok(issue)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct TimelineEventPayload {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl TimelineEventPayload {
    /// Converts the payload, dropping entries that carry no event name.
    pub(super) fn into_event(self) -> Option<TimelineEvent> {
        let kind = TimelineEventKind::from(self.event?);
        Some(TimelineEvent {
            kind,
            created_at: self.created_at,
        })
    }
}
