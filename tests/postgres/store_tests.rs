//! Task store behaviour against a real `PostgreSQL` schema.

use taskboard::task::{
    domain::{NoteKind, TaskState},
    ports::TaskStore,
    services::{CreateTaskRequest, LifecycleErrorKind, ListTasksRequest, PromoteTaskRequest},
};
use rstest::rstest;

use super::helpers::{BoxError, PASSWORD, force_state, pg_context};

fn create_request(name: &str) -> CreateTaskRequest {
    CreateTaskRequest::new("alice", PASSWORD, "tst", name)
}

#[rstest]
#[ignore = "needs PostgreSQL; set TASKBOARD_TEST_DATABASE_URL and run with --ignored"]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_create_then_list_by_state() -> Result<(), BoxError> {
    let ctx = pg_context().await?;

    let created = ctx
        .service
        .create_task(create_request("Fix bug").with_description("Crash on save"))
        .await?;
    assert_eq!(created.id().to_string(), "tst_1");

    let open = ctx
        .service
        .list_by_state(ListTasksRequest::new("bob", PASSWORD, "open"))
        .await?;
    assert_eq!(open, vec![created.clone()]);

    let stored = ctx.store.find_task(created.id()).await?;
    assert_eq!(stored.as_ref().and_then(|task| task.description()), Some("Crash on save"));

    let trail = ctx.service.audit_trail(created.id()).await?;
    assert_eq!(trail.len(), 1);
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL; set TASKBOARD_TEST_DATABASE_URL and run with --ignored"]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_concurrent_creates_allocate_a_gapless_sequence() -> Result<(), BoxError> {
    let ctx = pg_context().await?;

    let mut handles = Vec::new();
    for index in 0..8 {
        let service = ctx.service.clone();
        handles.push(tokio::spawn(async move {
            service.create_task(create_request(&format!("task {index}"))).await
        }));
    }
    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await??.id().number().value());
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=8).collect::<Vec<u64>>());
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL; set TASKBOARD_TEST_DATABASE_URL and run with --ignored"]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_concurrent_promotions_succeed_once() -> Result<(), BoxError> {
    let ctx = pg_context().await?;
    let created = ctx.service.create_task(create_request("Fix bug")).await?;
    force_state(&ctx.url, "tst_1", "doing").await?;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = ctx.service.clone();
        handles.push(tokio::spawn(async move {
            service
                .promote_to_done(PromoteTaskRequest::new("bob", PASSWORD, "tst_1").with_note("ship it"))
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await? {
            Ok(promoted) => {
                successes += 1;
                let report = promoted.notification.wait().await;
                assert_eq!(
                    report.map(|report| report.recipients),
                    Some(vec!["bob@example.com".to_owned()])
                );
            }
            Err(err) => assert_eq!(err.kind(), LifecycleErrorKind::InvalidTransition),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(ctx.notifier.sent().len(), 1);

    let stored = ctx.store.find_task(created.id()).await?;
    assert_eq!(stored.map(|task| task.state()), Some(TaskState::Done));

    let kinds: Vec<NoteKind> = ctx
        .service
        .audit_trail(created.id())
        .await?
        .iter()
        .map(|entry| entry.kind)
        .collect();
    assert_eq!(kinds, vec![NoteKind::System, NoteKind::System, NoteKind::User]);
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL; set TASKBOARD_TEST_DATABASE_URL and run with --ignored"]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_overlong_name_is_rejected_without_consuming_a_number() -> Result<(), BoxError> {
    let ctx = pg_context().await?;

    let err = ctx
        .service
        .create_task(create_request(&"x".repeat(300)))
        .await
        .err()
        .ok_or("overlong name should be rejected")?;
    assert_eq!(err.kind(), LifecycleErrorKind::DataTooLong);

    let created = ctx.service.create_task(create_request("short")).await?;
    assert_eq!(created.id().to_string(), "tst_1");
    Ok(())
}
