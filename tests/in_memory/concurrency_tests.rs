//! Concurrency tests for identifier allocation and promotion.

use super::helpers::{Harness, create_request, force_state, harness, promote_request};
use taskboard::task::{
    domain::{TaskId, TaskState},
    services::LifecycleErrorKind,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_allocate_a_gapless_sequence(harness: Harness) {
    const CREATES: u64 = 16;
    let mut handles = Vec::new();
    for index in 0..CREATES {
        let service = harness.service.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_task(create_request(&format!("task {index}")))
                .await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let task = handle
            .await
            .expect("create task should not panic")
            .expect("task creation should succeed");
        numbers.push(task.id().number().value());
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=CREATES).collect::<Vec<_>>());
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_promotions_of_one_task_succeed_once(harness: Harness) {
    let created = harness
        .service
        .create_task(create_request("Fix bug"))
        .await
        .expect("task creation should succeed");
    force_state(&harness.store, created, TaskState::Doing);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = harness.service.clone();
        handles.push(tokio::spawn(async move {
            service
                .promote_to_done(promote_request("bob", "tst_1"))
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("promotion should not panic") {
            Ok(promoted) => {
                successes += 1;
                promoted.notification.wait().await;
            }
            Err(err) => assert_eq!(err.kind(), LifecycleErrorKind::InvalidTransition),
        }
    }
    assert_eq!(successes, 1);

    let id = TaskId::parse("tst_1").expect("valid id");
    let trail = harness
        .service
        .audit_trail(&id)
        .await
        .expect("audit trail should load");
    assert_eq!(trail.len(), 2);
    assert_eq!(harness.notifier.sent().len(), 1);
}
