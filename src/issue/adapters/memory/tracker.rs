//! In-memory issue tracker for reconciliation tests.

use crate::issue::{
    domain::{
        IssueEdit, IssueNumber, NewIssue, RemoteIssue, RemoteIssueState, RepositoryRef,
        TimelineEvent,
    },
    ports::{IssueTracker, IssueTrackerError, IssueTrackerResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Tracker operations, used for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerOperation {
    /// [`IssueTracker::list_issues`].
    ListIssues,
    /// [`IssueTracker::create_issue`].
    CreateIssue,
    /// [`IssueTracker::edit_issue`].
    EditIssue,
    /// [`IssueTracker::list_timeline`].
    ListTimeline,
}

impl TrackerOperation {
    const fn name(self) -> &'static str {
        match self {
            Self::ListIssues => "list issues",
            Self::CreateIssue => "create issue",
            Self::EditIssue => "edit issue",
            Self::ListTimeline => "list timeline",
        }
    }
}

/// In-memory issue tracker.
///
/// Issues keep insertion order, numbers are assigned per repository starting
/// at 1, and any operation can be made to fail with a chosen error. Every
/// attempted call is counted, including injected failures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueTracker {
    state: Arc<RwLock<InMemoryTrackerState>>,
}

#[derive(Debug, Default)]
struct InMemoryTrackerState {
    repositories: HashMap<RepositoryRef, RepositoryIssues>,
    failures: HashMap<TrackerOperation, IssueTrackerError>,
    calls: HashMap<TrackerOperation, usize>,
    next_id: u64,
}

#[derive(Debug, Default)]
struct RepositoryIssues {
    issues: Vec<RemoteIssue>,
    timelines: HashMap<IssueNumber, Vec<TimelineEvent>>,
}

fn lock_error(err: impl std::fmt::Display) -> IssueTrackerError {
    IssueTrackerError::transport(std::io::Error::other(err.to_string()))
}

fn not_found(operation: TrackerOperation, number: IssueNumber) -> IssueTrackerError {
    IssueTrackerError::rejected(operation.name(), 404, format!("issue #{number} not found"))
}

impl InMemoryTrackerState {
    /// Counts the call and returns the injected failure, if any.
    fn enter(&mut self, operation: TrackerOperation) -> IssueTrackerResult<()> {
        *self.calls.entry(operation).or_default() += 1;
        self.failures.get(&operation).cloned().map_or(Ok(()), Err)
    }

    fn allocate(&mut self, repository: &RepositoryRef) -> IssueTrackerResult<(u64, IssueNumber)> {
        self.next_id += 1;
        let issues = &self.repositories.entry(repository.clone()).or_default().issues;
        let highest = issues
            .iter()
            .map(|issue| issue.number().value())
            .max()
            .unwrap_or_default();
        let number = IssueNumber::new(highest + 1).map_err(|err| {
            IssueTrackerError::rejected(TrackerOperation::CreateIssue.name(), 422, err.to_string())
        })?;
        Ok((self.next_id, number))
    }
}

impl InMemoryIssueTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an existing issue to a repository.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn seed_issue(
        &self,
        repository: &RepositoryRef,
        issue: RemoteIssue,
    ) -> IssueTrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .repositories
            .entry(repository.clone())
            .or_default()
            .issues
            .push(issue);
        Ok(())
    }

    /// Replaces the timeline of an issue. Events are ordered oldest first.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_timeline(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
        events: Vec<TimelineEvent>,
    ) -> IssueTrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .repositories
            .entry(repository.clone())
            .or_default()
            .timelines
            .insert(number, events);
        Ok(())
    }

    /// Makes every later call to `operation` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn fail(
        &self,
        operation: TrackerOperation,
        error: IssueTrackerError,
    ) -> IssueTrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failures.insert(operation, error);
        Ok(())
    }

    /// Removes an injected failure.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn recover(&self, operation: TrackerOperation) -> IssueTrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failures.remove(&operation);
        Ok(())
    }

    /// Returns how many times `operation` was attempted.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn call_count(&self, operation: TrackerOperation) -> IssueTrackerResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.calls.get(&operation).copied().unwrap_or_default())
    }

    /// Returns a snapshot of the repository's issues.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn issues(&self, repository: &RepositoryRef) -> IssueTrackerResult<Vec<RemoteIssue>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .repositories
            .get(repository)
            .map(|repo| repo.issues.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl IssueTracker for InMemoryIssueTracker {
    async fn list_issues(
        &self,
        repository: &RepositoryRef,
    ) -> IssueTrackerResult<Vec<RemoteIssue>> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.enter(TrackerOperation::ListIssues)?;
        Ok(state
            .repositories
            .get(repository)
            .map(|repo| repo.issues.clone())
            .unwrap_or_default())
    }

    async fn create_issue(
        &self,
        repository: &RepositoryRef,
        issue: &NewIssue,
    ) -> IssueTrackerResult<RemoteIssue> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.enter(TrackerOperation::CreateIssue)?;
        let (id, number) = state.allocate(repository)?;
        let created = RemoteIssue::new(id, number, issue.title.clone(), RemoteIssueState::Open)
            .with_body(issue.body.clone());
        state
            .repositories
            .entry(repository.clone())
            .or_default()
            .issues
            .push(created.clone());
        Ok(created)
    }

    async fn edit_issue(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
        edit: &IssueEdit,
    ) -> IssueTrackerResult<RemoteIssue> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.enter(TrackerOperation::EditIssue)?;
        let existing = state
            .repositories
            .get_mut(repository)
            .and_then(|repo| repo.issues.iter_mut().find(|issue| issue.number() == number))
            .ok_or_else(|| not_found(TrackerOperation::EditIssue, number))?;

        let mut edited = existing.clone();
        if let Some(body) = &edit.body {
            edited = edited.with_body(body.clone());
        }
        if let Some(issue_state) = &edit.state {
            edited = edited.with_state(issue_state.clone());
        }
        *existing = edited.clone();
        Ok(edited)
    }

    async fn list_timeline(
        &self,
        repository: &RepositoryRef,
        number: IssueNumber,
    ) -> IssueTrackerResult<Vec<TimelineEvent>> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.enter(TrackerOperation::ListTimeline)?;
        let repo = state
            .repositories
            .get(repository)
            .ok_or_else(|| not_found(TrackerOperation::ListTimeline, number))?;
        if !repo.issues.iter().any(|issue| issue.number() == number) {
            return Err(not_found(TrackerOperation::ListTimeline, number));
        }
        Ok(repo.timelines.get(&number).cloned().unwrap_or_default())
    }
}
