//! In-memory integration tests for creation, adoption, and drift correction.

use super::helpers::{REPO_URL, Setup, repository, setup};
use issue_reconciler::issue::{
    adapters::memory::TrackerOperation,
    domain::{
        CLOSE_ISSUE_FINALIZER, ConditionStatus, ConditionType, GithubIssueSpec, IssueNumber,
        PullRequestLink, RemoteIssue, RemoteIssueState, RepositoryRef, TimelineEvent,
        TimelineEventKind,
    },
    ports::IssueTrackerError,
    services::ReconcileError,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_declaration_creates_issue_and_projects_status(
    setup: Setup,
    repository: RepositoryRef,
) -> Result<(), eyre::Report> {
    let key = setup.declare("disk-alert", "Disk almost full", "node-3 at 95%")?;

    let outcome = setup.reconciler.reconcile(&key).await?;

    eyre::ensure!(outcome.requeue_delay().is_some(), "expected a resync");
    let issues = setup.tracker.issues(&repository)?;
    let created = issues
        .first()
        .ok_or_else(|| eyre::eyre!("expected a created issue"))?;
    assert_eq!(created.title(), "Disk almost full");
    assert_eq!(created.body(), Some("node-3 at 95%"));

    let resource = setup.fetch(&key).await?;
    assert!(resource.has_finalizer(CLOSE_ISSUE_FINALIZER));
    assert!(resource.conditions().is_true(ConditionType::IsOpen));
    assert_eq!(
        resource.conditions().status_of(ConditionType::HasPr),
        Some(ConditionStatus::False)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_declaration_with_same_title_reuses_issue(
    setup: Setup,
    repository: RepositoryRef,
) -> Result<(), eyre::Report> {
    let first = setup.declare("first", "Shared title", "")?;
    let second = setup.declare("second", "shared TITLE", "")?;

    setup.reconciler.reconcile(&first).await?;
    setup.reconciler.reconcile(&second).await?;

    assert_eq!(setup.tracker.issues(&repository)?.len(), 1);
    assert_eq!(setup.calls(TrackerOperation::CreateIssue)?, 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_remote_issue_with_pull_request_is_reflected(
    setup: Setup,
    repository: RepositoryRef,
) -> Result<(), eyre::Report> {
    let number = IssueNumber::new(41)?;
    setup.tracker.seed_issue(
        &repository,
        RemoteIssue::new(4100, number, "Flaky test", RemoteIssueState::Closed)
            .with_body("retry")
            .with_pull_request(PullRequestLink { html_url: None }),
    )?;
    let key = setup.declare("flaky", "Flaky test", "retry")?;

    setup.reconciler.reconcile(&key).await?;

    let resource = setup.fetch(&key).await?;
    assert_eq!(
        resource.conditions().status_of(ConditionType::IsOpen),
        Some(ConditionStatus::False)
    );
    assert!(resource.conditions().is_true(ConditionType::HasPr));
    assert_eq!(setup.calls(TrackerOperation::EditIssue)?, 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pull_request_disconnect_flips_condition(
    setup: Setup,
    repository: RepositoryRef,
) -> Result<(), eyre::Report> {
    let number = IssueNumber::new(2)?;
    setup.tracker.seed_issue(
        &repository,
        RemoteIssue::new(200, number, "Refactor", RemoteIssueState::Open),
    )?;
    setup.tracker.set_timeline(
        &repository,
        number,
        vec![TimelineEvent::new(TimelineEventKind::CrossReferenced)],
    )?;
    let key = setup.declare("refactor", "Refactor", "")?;

    setup.reconciler.reconcile(&key).await?;
    let linked = setup.fetch(&key).await?;
    let linked_at = linked
        .conditions()
        .get(ConditionType::HasPr)
        .map(|condition| condition.last_transition_time)
        .ok_or_else(|| eyre::eyre!("HasPR missing"))?;

    setup.tracker.set_timeline(
        &repository,
        number,
        vec![
            TimelineEvent::new(TimelineEventKind::CrossReferenced),
            TimelineEvent::new(TimelineEventKind::Disconnected),
        ],
    )?;
    setup.reconciler.reconcile(&key).await?;

    let unlinked = setup.fetch(&key).await?;
    let has_pr = unlinked
        .conditions()
        .get(ConditionType::HasPr)
        .ok_or_else(|| eyre::eyre!("HasPR missing"))?;
    assert!(linked.conditions().is_true(ConditionType::HasPr));
    assert_eq!(has_pr.status, ConditionStatus::False);
    assert!(has_pr.last_transition_time >= linked_at);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recovered_tracker_completes_creation_on_retry(
    setup: Setup,
    repository: RepositoryRef,
) -> Result<(), eyre::Report> {
    let key = setup.declare("retry", "Retry me", "")?;
    setup.tracker.fail(
        TrackerOperation::CreateIssue,
        IssueTrackerError::rejected("create issue", 500, "server error"),
    )?;

    let failed = setup.reconciler.reconcile(&key).await;
    setup.tracker.recover(TrackerOperation::CreateIssue)?;
    setup.reconciler.reconcile(&key).await?;

    assert!(matches!(failed, Err(ReconcileError::RemoteApi(_))));
    assert_eq!(setup.tracker.issues(&repository)?.len(), 1);
    let resource = setup.fetch(&key).await?;
    assert!(resource.conditions().is_true(ConditionType::IsOpen));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repository_change_targets_new_repository(setup: Setup) -> Result<(), eyre::Report> {
    let key = setup.declare("moving", "Moving issue", "")?;
    setup.reconciler.reconcile(&key).await?;

    let spec = GithubIssueSpec::new("https://github.com/acme/infra", "Moving issue", "")?;
    setup.store.replace_spec(&key, spec)?;
    setup.reconciler.reconcile(&key).await?;

    let old = RepositoryRef::from_url(REPO_URL)?;
    let new = RepositoryRef::new("acme", "infra")?;
    assert_eq!(setup.tracker.issues(&old)?.len(), 1);
    assert_eq!(setup.tracker.issues(&new)?.len(), 1);
    Ok(())
}
