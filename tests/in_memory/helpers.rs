//! Shared test helpers for in-memory integration tests.

use std::sync::{Arc, OnceLock};

use taskboard::task::{
    adapters::{
        credentials::BcryptVerifier,
        memory::{InMemoryTaskStore, RecordingNotifier},
    },
    domain::{AppAcronym, Application, GroupName, RunningNumber, Task, TaskState, UserAccount, Username},
    ports::Notifier,
    services::{CreateTaskRequest, NotificationSettings, PromoteTaskRequest, TaskLifecycleService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Password shared by every seeded account.
pub const PASSWORD: &str = "correct horse";

/// Service type used by the in-memory tests.
pub type TestService = TaskLifecycleService<InMemoryTaskStore, DefaultClock>;

/// Store, notifier, and service wired together.
pub struct Harness {
    /// Store backing the service.
    pub store: Arc<InMemoryTaskStore>,
    /// Notifier recording every done notification.
    pub notifier: RecordingNotifier,
    /// Service under test.
    pub service: TestService,
}

/// Returns a bcrypt hash of [`PASSWORD`], computed once at minimum cost.
///
/// # Panics
///
/// Panics if bcrypt cannot hash the password.
pub fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| bcrypt::hash(PASSWORD, 4).expect("bcrypt hashes the test password"))
        .clone()
}

fn account(name: &str, email: Option<&str>, disabled: bool) -> UserAccount {
    UserAccount {
        username: Username::new(name).expect("valid username"),
        password_hash: password_hash(),
        disabled,
        email: email.map(ToOwned::to_owned),
    }
}

fn add_member(store: &InMemoryTaskStore, name: &str, group: &str) {
    store
        .add_member(
            Username::new(name).expect("valid username"),
            GroupName::new(group).expect("valid group"),
        )
        .expect("membership stored");
}

/// Builds a store holding application `tst` (create: `dev`, done: `leads`).
///
/// `alice` is in `dev`; `bob`, `erin` (no email), and the `-` placeholder
/// are in `leads`; `carol` is disabled; `dave` belongs to no group.
///
/// # Panics
///
/// Panics if seeding fails.
pub fn seeded_store() -> InMemoryTaskStore {
    let store = InMemoryTaskStore::new();
    for user in [
        account("alice", Some("alice@example.com"), false),
        account("bob", Some("bob@example.com"), false),
        account("carol", Some("carol@example.com"), true),
        account("dave", Some("dave@example.com"), false),
        account("erin", None, false),
    ] {
        store.insert_user(user).expect("user stored");
    }
    store
        .insert_application(Application {
            acronym: AppAcronym::new("tst").expect("valid acronym"),
            running_number: RunningNumber::ZERO,
            permit_create_group: GroupName::new("dev").expect("valid group"),
            permit_done_group: GroupName::new("leads").expect("valid group"),
        })
        .expect("application stored");
    add_member(&store, "alice", "dev");
    add_member(&store, "carol", "dev");
    add_member(&store, "bob", "leads");
    add_member(&store, "erin", "leads");
    add_member(&store, "-", "leads");
    store
}

/// Wires a service over a seeded store with the given notifier.
pub fn service_with(store: Arc<InMemoryTaskStore>, notifier: Arc<dyn Notifier>) -> TestService {
    TaskLifecycleService::new(
        store,
        Arc::new(DefaultClock),
        Arc::new(BcryptVerifier),
        notifier,
        NotificationSettings {
            link_base: "https://tasks.example.com/tasks/".to_owned(),
            unassigned_member: "-".to_owned(),
        },
    )
}

/// Provides a fresh harness for each test.
#[fixture]
pub fn harness() -> Harness {
    let store = Arc::new(seeded_store());
    let notifier = RecordingNotifier::new();
    let service = service_with(Arc::clone(&store), Arc::new(notifier.clone()));
    Harness {
        store,
        notifier,
        service,
    }
}

/// Builds a create request for `alice` under `tst`.
pub fn create_request(name: &str) -> CreateTaskRequest {
    CreateTaskRequest::new("alice", PASSWORD, "tst", name)
}

/// Builds a promote request authenticated with [`PASSWORD`].
pub fn promote_request(username: &str, task_id: &str) -> PromoteTaskRequest {
    PromoteTaskRequest::new(username, PASSWORD, task_id)
}

/// Moves a stored task into `state`, bypassing the lifecycle rules.
///
/// # Panics
///
/// Panics if the store rejects the update.
pub fn force_state(store: &InMemoryTaskStore, task: Task, state: TaskState) -> Task {
    let mut data = task.into_persisted();
    data.state = state;
    let moved = Task::from_persisted(data);
    store.put_task(moved.clone()).expect("task stored");
    moved
}
