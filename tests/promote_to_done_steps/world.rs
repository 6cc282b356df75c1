//! Shared world state for promote-to-done BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::task::{
    adapters::{
        credentials::BcryptVerifier,
        memory::{InMemoryTaskStore, RecordingNotifier},
    },
    services::{DeliveryReport, NotificationSettings, TaskLifecycleError, TaskLifecycleService},
};

/// Password shared by every scenario account.
pub const PASSWORD: &str = "scenario password";

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskStore, DefaultClock>;

/// Scenario world for promotion behaviour tests.
pub struct PromotionWorld {
    pub store: Arc<InMemoryTaskStore>,
    pub notifier: RecordingNotifier,
    pub service: TestTaskService,
    /// Hash stored for every scenario account.
    pub password_hash: String,
    pub last_error: Option<TaskLifecycleError>,
    /// Report of the last successful promotion's notification batch.
    pub last_report: Option<DeliveryReport>,
}

impl PromotionWorld {
    /// Creates a world over an empty store.
    ///
    /// # Panics
    ///
    /// Panics if bcrypt cannot hash the scenario password.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        let notifier = RecordingNotifier::new();
        let service = TaskLifecycleService::new(
            Arc::clone(&store),
            Arc::new(DefaultClock),
            Arc::new(BcryptVerifier),
            Arc::new(notifier.clone()),
            NotificationSettings::default(),
        );

        Self {
            store,
            notifier,
            service,
            password_hash: bcrypt::hash(PASSWORD, 4).expect("bcrypt hashes the scenario password"),
            last_error: None,
            last_report: None,
        }
    }
}

impl Default for PromotionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PromotionWorld {
    PromotionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
