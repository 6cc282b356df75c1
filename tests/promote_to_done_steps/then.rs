//! Then steps for promote-to-done BDD scenarios.

use super::world::{PromotionWorld, run_async};
use rstest_bdd_macros::then;
use taskboard::task::{
    domain::{TaskId, TaskState},
    ports::TaskStore,
    services::LifecycleErrorKind,
};

#[then(r#"the task "{task_id}" is in state "{state}""#)]
fn task_state_is(world: &PromotionWorld, task_id: String, state: String) -> Result<(), eyre::Report> {
    let expected = TaskState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let id = TaskId::parse(task_id)?;
    let task = run_async(world.store.find_task(&id))?
        .ok_or_else(|| eyre::eyre!("task {id} not found"))?;
    eyre::ensure!(
        task.state() == expected,
        "expected state {expected}, found {}",
        task.state()
    );
    Ok(())
}

#[then(r#"the audit trail of "{task_id}" has {count:usize} entries"#)]
fn audit_trail_has(world: &PromotionWorld, task_id: String, count: usize) -> Result<(), eyre::Report> {
    let id = TaskId::parse(task_id)?;
    let trail = run_async(world.service.audit_trail(&id))?;
    eyre::ensure!(
        trail.len() == count,
        "expected {count} audit entries, found {}",
        trail.len()
    );
    Ok(())
}

#[then(r#"the done notification went only to "{email}""#)]
fn notification_went_only_to(world: &PromotionWorld, email: String) -> Result<(), eyre::Report> {
    let report = world
        .last_report
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing delivery report"))?;
    eyre::ensure!(
        report.recipients == vec![email.clone()],
        "expected only {email}, notified {:?}",
        report.recipients
    );
    eyre::ensure!(report.delivered, "notification was not delivered");
    Ok(())
}

#[then("the notifier has sent {count:usize} messages")]
fn notifier_has_sent(world: &PromotionWorld, count: usize) -> Result<(), eyre::Report> {
    let sent = world.notifier.sent().len();
    eyre::ensure!(sent == count, "expected {count} messages, found {sent}");
    Ok(())
}

fn expect_failure(world: &PromotionWorld, expected: LifecycleErrorKind) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the promotion to fail"))?;
    eyre::ensure!(
        err.kind() == expected,
        "expected {expected:?}, got {err:?}"
    );
    Ok(())
}

#[then("the promotion fails with an invalid transition error")]
fn promotion_fails_with_invalid_transition(world: &PromotionWorld) -> Result<(), eyre::Report> {
    expect_failure(world, LifecycleErrorKind::InvalidTransition)
}

#[then("the promotion fails with a forbidden error")]
fn promotion_fails_with_forbidden(world: &PromotionWorld) -> Result<(), eyre::Report> {
    expect_failure(world, LifecycleErrorKind::Forbidden)
}
