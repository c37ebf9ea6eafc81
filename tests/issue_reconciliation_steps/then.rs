//! Then steps for declared issue reconciliation scenarios.

use super::world::{ReconcileWorld, run_async};
use issue_reconciler::issue::{
    adapters::memory::TrackerOperation,
    domain::{CLOSE_ISSUE_FINALIZER, ConditionStatus, ConditionType, GithubIssue},
    ports::ResourceStore,
    services::ReconcileError,
};
use rstest_bdd_macros::then;

fn fetch(world: &ReconcileWorld) -> Result<GithubIssue, eyre::Report> {
    let key = world.key()?;
    run_async(world.store.get(&key))?
        .ok_or_else(|| eyre::eyre!("declared issue {key} missing from store"))
}

fn last_error(world: &ReconcileWorld) -> Result<&ReconcileError, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(outcome)) => Err(eyre::eyre!("expected a failure, got {outcome:?}")),
        None => Err(eyre::eyre!("missing reconciliation result in scenario world")),
    }
}

#[then("the reconciliation requests a resync")]
fn requests_resync(world: &ReconcileWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing reconciliation result in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected reconciliation failure: {err}"))?;
    eyre::ensure!(
        outcome.requeue_delay().is_some(),
        "expected a requeue request"
    );
    Ok(())
}

#[then(r#"a remote issue titled "{title}" exists with body "{body}""#)]
fn remote_issue_exists(
    world: &ReconcileWorld,
    title: String,
    body: String,
) -> Result<(), eyre::Report> {
    let issues = world.tracker.issues(&world.repository()?)?;
    eyre::ensure!(
        issues
            .iter()
            .any(|issue| issue.title() == title && issue.body() == Some(body.as_str())),
        "no remote issue titled {title} with body {body}"
    );
    Ok(())
}

#[then(r#"the "{condition}" condition is "{status}""#)]
fn condition_has_status(
    world: &ReconcileWorld,
    condition: String,
    status: String,
) -> Result<(), eyre::Report> {
    let condition_type = ConditionType::try_from(condition.as_str())?;
    let expected = ConditionStatus::try_from(status.as_str())?;
    let actual = fetch(world)?.conditions().status_of(condition_type);
    eyre::ensure!(
        actual == Some(expected),
        "expected {condition_type}={expected}, found {actual:?}"
    );
    Ok(())
}

#[then("the declared issue carries the close finalizer")]
fn carries_finalizer(world: &ReconcileWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        fetch(world)?.has_finalizer(CLOSE_ISSUE_FINALIZER),
        "expected the close finalizer on the declared issue"
    );
    Ok(())
}

#[then("the reconciliation fails with a remote API error")]
fn fails_with_remote_error(world: &ReconcileWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    eyre::ensure!(
        matches!(err, ReconcileError::RemoteApi(_)),
        "expected a remote API error, got {err:?}"
    );
    Ok(())
}

#[then("no remote issue was created")]
fn nothing_created(world: &ReconcileWorld) -> Result<(), eyre::Report> {
    let creates = world.tracker.call_count(TrackerOperation::CreateIssue)?;
    eyre::ensure!(creates == 0, "expected no create calls, saw {creates}");
    Ok(())
}

#[then(r#"the remote issue "{title}" is closed"#)]
fn remote_issue_closed(world: &ReconcileWorld, title: String) -> Result<(), eyre::Report> {
    let issues = world.tracker.issues(&world.repository()?)?;
    let issue = issues
        .iter()
        .find(|issue| issue.title() == title)
        .ok_or_else(|| eyre::eyre!("no remote issue titled {title}"))?;
    eyre::ensure!(
        !issue.state().is_open(),
        "expected {title} to be closed, found {}",
        issue.state()
    );
    Ok(())
}

#[then("the declared issue no longer exists")]
fn declared_issue_removed(world: &ReconcileWorld) -> Result<(), eyre::Report> {
    let key = world.key()?;
    let remaining = run_async(world.store.get(&key))?;
    eyre::ensure!(remaining.is_none(), "expected {key} to be removed");
    Ok(())
}

#[then("the reconciliation fails permanently")]
fn fails_permanently(world: &ReconcileWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    eyre::ensure!(err.is_permanent(), "expected a permanent failure, got {err:?}");
    Ok(())
}

#[then("no remote issues were listed")]
fn nothing_listed(world: &ReconcileWorld) -> Result<(), eyre::Report> {
    let lists = world.tracker.call_count(TrackerOperation::ListIssues)?;
    eyre::ensure!(lists == 0, "expected no list calls, saw {lists}");
    Ok(())
}
