//! In-memory integration tests for task lifecycle operations.

use std::sync::Arc;

use super::helpers::{
    Harness, PASSWORD, create_request, force_state, harness, promote_request, seeded_store,
    service_with,
};
use taskboard::task::{
    adapters::logging::TracingNotifier,
    domain::{NoteKind, TaskId, TaskState},
    services::{LifecycleErrorKind, ListTasksRequest, PromoteTaskRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_task_of_an_application_is_numbered_one(harness: Harness) {
    let task = harness
        .service
        .create_task(create_request("Fix bug"))
        .await
        .expect("task creation should succeed");

    assert_eq!(task.id().to_string(), "tst_1");
    assert_eq!(task.state(), TaskState::Open);

    let trail = harness
        .service
        .audit_trail(task.id())
        .await
        .expect("audit trail should load");
    assert_eq!(trail.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn promotion_with_note_appends_two_entries_and_notifies_done_group(harness: Harness) {
    let created = harness
        .service
        .create_task(create_request("Fix bug"))
        .await
        .expect("task creation should succeed");
    force_state(&harness.store, created, TaskState::Doing);

    let promoted = harness
        .service
        .promote_to_done(promote_request("bob", "tst_1").with_note("looks good"))
        .await
        .expect("promotion should succeed");
    let report = promoted
        .notification
        .wait()
        .await
        .expect("notification batch should finish");

    assert_eq!(report.recipients, vec!["bob@example.com".to_owned()]);
    assert!(report.skipped.iter().all(|member| member.as_str() != "-"));
    let sent = harness.notifier.sent();
    let message = sent.first().expect("one notification");
    assert!(message.body.contains("https://tasks.example.com/tasks/tst_1"));
    assert!(message.subject.contains("fix bug"));

    let trail = harness
        .service
        .audit_trail(promoted.task.id())
        .await
        .expect("audit trail should load");
    let kinds: Vec<_> = trail.iter().map(|entry| entry.kind).collect();
    assert_eq!(kinds, vec![NoteKind::System, NoteKind::System, NoteKind::User]);
    assert!(trail.windows(2).all(|pair| match pair {
        [earlier, later] => earlier.date < later.date,
        _ => false,
    }));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn promotion_without_note_appends_one_entry(harness: Harness) {
    let created = harness
        .service
        .create_task(create_request("Fix bug"))
        .await
        .expect("task creation should succeed");
    force_state(&harness.store, created, TaskState::Doing);

    let blank_note = PromoteTaskRequest::new("bob", PASSWORD, "tst_1").with_note("   ");
    let promoted = harness
        .service
        .promote_to_done(blank_note)
        .await
        .expect("promotion should succeed");
    promoted.notification.wait().await;

    let trail = harness
        .service
        .audit_trail(promoted.task.id())
        .await
        .expect("audit trail should load");
    assert_eq!(trail.len(), 2);
}

#[rstest]
#[case(TaskState::Open)]
#[case(TaskState::Todo)]
#[case(TaskState::Done)]
#[case(TaskState::Closed)]
#[tokio::test(flavor = "multi_thread")]
async fn only_doing_tasks_can_be_promoted(harness: Harness, #[case] state: TaskState) {
    let created = harness
        .service
        .create_task(create_request("Fix bug"))
        .await
        .expect("task creation should succeed");
    force_state(&harness.store, created, state);

    let err = harness
        .service
        .promote_to_done(promote_request("bob", "tst_1").with_note("ship it"))
        .await
        .expect_err("promotion should be rejected");
    assert_eq!(err.kind(), LifecycleErrorKind::InvalidTransition);

    let id = TaskId::parse("tst_1").expect("valid id");
    let trail = harness
        .service
        .audit_trail(&id)
        .await
        .expect("audit trail should load");
    assert_eq!(trail.len(), 1);
    assert!(harness.notifier.sent().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_users_fail_every_action(harness: Harness) {
    let create = harness
        .service
        .create_task(taskboard::task::services::CreateTaskRequest::new(
            "carol", PASSWORD, "tst", "Fix bug",
        ))
        .await
        .expect_err("carol is disabled");
    let list = harness
        .service
        .list_by_state(ListTasksRequest::new("carol", PASSWORD, "open"))
        .await
        .expect_err("carol is disabled");
    let promote = harness
        .service
        .promote_to_done(promote_request("carol", "tst_1"))
        .await
        .expect_err("carol is disabled");

    for err in [create, list, promote] {
        assert_eq!(err.kind(), LifecycleErrorKind::AuthDisabled);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tracing_notifier_accepts_done_notifications() {
    let store = Arc::new(seeded_store());
    let service = service_with(Arc::clone(&store), Arc::new(TracingNotifier));
    let created = service
        .create_task(create_request("Fix bug"))
        .await
        .expect("task creation should succeed");
    force_state(&store, created, TaskState::Doing);

    let promoted = service
        .promote_to_done(promote_request("bob", "tst_1"))
        .await
        .expect("promotion should succeed");
    let report = promoted
        .notification
        .wait()
        .await
        .expect("notification batch should finish");
    assert!(report.delivered);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_delivery_keeps_the_task_done(harness: Harness) {
    let created = harness
        .service
        .create_task(create_request("Fix bug"))
        .await
        .expect("task creation should succeed");
    force_state(&harness.store, created, TaskState::Doing);
    harness.notifier.fail_deliveries(true);

    let promoted = harness
        .service
        .promote_to_done(promote_request("bob", "tst_1"))
        .await
        .expect("promotion should commit before delivery");
    let report = promoted
        .notification
        .wait()
        .await
        .expect("notification batch should finish");
    assert_eq!(report.recipients, vec!["bob@example.com".to_owned()]);
    assert!(!report.delivered);
    assert!(harness.notifier.sent().is_empty());

    let done = harness
        .service
        .list_by_state(ListTasksRequest::new("bob", PASSWORD, "done"))
        .await
        .expect("listing should succeed");
    assert_eq!(done.len(), 1);
}
