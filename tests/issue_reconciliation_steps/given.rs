//! Given steps for declared issue reconciliation scenarios.

use super::world::{ReconcileWorld, run_async};
use eyre::WrapErr;
use issue_reconciler::issue::{
    adapters::memory::TrackerOperation,
    domain::{
        GithubIssue, GithubIssueSpec, IssueNumber, RemoteIssue, RemoteIssueState, ResourceKey,
        TimelineEvent, TimelineEventKind,
    },
    ports::IssueTrackerError,
};
use rstest_bdd_macros::given;

#[given(r#"a declared issue "{title}" with description "{description}" in "{repo}""#)]
fn declared_issue(
    world: &mut ReconcileWorld,
    title: String,
    description: String,
    repo: String,
) -> Result<(), eyre::Report> {
    declare(world, title, description, repo)
}

#[given(r#"a declared issue "{title}" without description in "{repo}""#)]
fn declared_issue_without_description(
    world: &mut ReconcileWorld,
    title: String,
    repo: String,
) -> Result<(), eyre::Report> {
    declare(world, title, String::new(), repo)
}

fn declare(
    world: &mut ReconcileWorld,
    title: String,
    description: String,
    repo: String,
) -> Result<(), eyre::Report> {
    let key = ResourceKey::new("default", "scenario-issue").wrap_err("construct resource key")?;
    let spec = GithubIssueSpec::new(repo.clone(), title, description)
        .wrap_err("construct declared spec")?;
    world
        .store
        .insert(GithubIssue::new(key.clone(), spec))
        .wrap_err("store declared issue")?;
    world.key = Some(key);
    world.repo_url = Some(repo);
    Ok(())
}

#[given("the remote repository has no issues")]
fn empty_remote_repository(world: &mut ReconcileWorld) -> Result<(), eyre::Report> {
    let repository = world.repository()?;
    let issues = world
        .tracker
        .issues(&repository)
        .wrap_err("read remote issues")?;
    eyre::ensure!(issues.is_empty(), "expected an empty remote repository");
    Ok(())
}

#[given("remote issue creation fails with status {status:u16}")]
fn creation_fails(world: &mut ReconcileWorld, status: u16) -> Result<(), eyre::Report> {
    world
        .tracker
        .fail(
            TrackerOperation::CreateIssue,
            IssueTrackerError::rejected("create issue", status, "injected failure"),
        )
        .wrap_err("inject create failure")?;
    Ok(())
}

#[given(r#"a remote issue "{title}" that is "{state}""#)]
fn remote_issue(
    world: &mut ReconcileWorld,
    title: String,
    state: String,
) -> Result<(), eyre::Report> {
    let repository = world.repository()?;
    let number = IssueNumber::new(1).wrap_err("construct issue number")?;
    world
        .tracker
        .seed_issue(
            &repository,
            RemoteIssue::new(100, number, title, RemoteIssueState::from(state)).with_body(""),
        )
        .wrap_err("seed remote issue")?;
    Ok(())
}

#[given(r#"its timeline records "{first}" then "{second}""#)]
fn timeline_records(
    world: &mut ReconcileWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let repository = world.repository()?;
    let number = IssueNumber::new(1).wrap_err("construct issue number")?;
    let events = [first, second]
        .into_iter()
        .map(|name| TimelineEvent::new(TimelineEventKind::from(name)))
        .collect();
    world
        .tracker
        .set_timeline(&repository, number, events)
        .wrap_err("set remote timeline")?;
    Ok(())
}

#[given("the declared issue has been reconciled once")]
fn reconciled_once(world: &mut ReconcileWorld) -> Result<(), eyre::Report> {
    let key = world.key()?;
    run_async(world.reconciler.reconcile(&key)).wrap_err("initial reconciliation")?;
    Ok(())
}
