//! Shared test helpers for `PostgreSQL` integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use taskboard::task::{
    adapters::{
        credentials::BcryptVerifier,
        memory::RecordingNotifier,
        postgres::{PostgresTaskStore, TaskPgPool},
    },
    services::{NotificationSettings, TaskLifecycleService},
};

/// Boxed error used by fixtures and tests.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable naming the test database.
pub const DATABASE_URL_VAR: &str = "TASKBOARD_TEST_DATABASE_URL";

/// SQL creating the task tables.
pub const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_task_tables/up.sql");

/// Password shared by every seeded account.
pub const PASSWORD: &str = "correct horse";

static NEXT_SCHEMA: AtomicU64 = AtomicU64::new(0);

/// Service type used by the `PostgreSQL` tests.
pub type PgService = TaskLifecycleService<PostgresTaskStore, DefaultClock>;

/// Store, notifier, and service over a private schema.
pub struct PgContext {
    /// Store backing the service.
    pub store: Arc<PostgresTaskStore>,
    /// Notifier recording every done notification.
    pub notifier: RecordingNotifier,
    /// Service under test.
    pub service: PgService,
    /// URL scoped to the private schema.
    pub url: String,
    _schema: TestSchema,
}

/// Schema dropped together with its guard.
struct TestSchema {
    base_url: String,
    name: String,
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        let sql = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name);
        let dropped: Result<(), BoxError> = PgConnection::establish(&self.base_url)
            .map_err(Into::into)
            .and_then(|mut conn| conn.batch_execute(&sql).map_err(Into::into));
        if let Err(err) = dropped {
            tracing::warn!(schema = %self.name, error = %err, "could not drop test schema");
        }
    }
}

fn scoped_url(base_url: &str, schema: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}options=-csearch_path%3D{schema}")
}

/// Provisions a private schema with seeded rows.
///
/// # Errors
///
/// Returns an error if no test database is configured, or if the schema,
/// tables, seed rows, or pool cannot be created.
pub async fn pg_context() -> Result<PgContext, BoxError> {
    let base_url = std::env::var(DATABASE_URL_VAR)
        .map_err(|_| format!("{DATABASE_URL_VAR} must name a PostgreSQL database for these tests"))?;
    let name = format!(
        "taskboard_test_{}_{}",
        std::process::id(),
        NEXT_SCHEMA.fetch_add(1, Ordering::SeqCst)
    );
    let url = scoped_url(&base_url, &name);
    let schema = TestSchema {
        base_url: base_url.clone(),
        name: name.clone(),
    };

    let seed_url = url.clone();
    tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        let mut admin = PgConnection::establish(&base_url)?;
        admin.batch_execute(&format!("CREATE SCHEMA {name}"))?;
        let mut conn = PgConnection::establish(&seed_url)?;
        conn.batch_execute(CREATE_TABLES_SQL)?;
        conn.batch_execute(&seed_sql(&bcrypt::hash(PASSWORD, 4)?))?;
        Ok(())
    })
    .await??;

    let pool: TaskPgPool = Pool::builder()
        .max_size(4)
        .build(ConnectionManager::<PgConnection>::new(url.clone()))?;
    let store = Arc::new(PostgresTaskStore::new(pool));
    let notifier = RecordingNotifier::new();
    let service = TaskLifecycleService::new(
        Arc::clone(&store),
        Arc::new(DefaultClock),
        Arc::new(BcryptVerifier),
        Arc::new(notifier.clone()),
        NotificationSettings::default(),
    );
    Ok(PgContext {
        store,
        notifier,
        service,
        url,
        _schema: schema,
    })
}

/// Seeds application `tst` (create: `dev`, done: `leads`) with `alice` in
/// `dev` and `bob` plus the `-` placeholder in `leads`.
fn seed_sql(password_hash: &str) -> String {
    format!(
        "INSERT INTO users (username, password_hash, disabled, email) VALUES
            ('alice', '{password_hash}', FALSE, 'alice@example.com'),
            ('bob', '{password_hash}', FALSE, 'bob@example.com');
        INSERT INTO applications (acronym, running_number, permit_create_group, permit_done_group)
            VALUES ('tst', 0, 'dev', 'leads');
        INSERT INTO user_groups (username, group_name) VALUES
            ('alice', 'dev'), ('bob', 'leads'), ('-', 'leads');"
    )
}

/// Moves `task_id` into `state` with a direct update.
///
/// # Errors
///
/// Returns an error if the connection or update fails.
pub async fn force_state(url: &str, task_id: &str, state: &str) -> Result<(), BoxError> {
    let url = url.to_owned();
    let sql = format!("UPDATE tasks SET state = '{state}' WHERE task_id = '{task_id}'");
    tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        PgConnection::establish(&url)?.batch_execute(&sql)?;
        Ok(())
    })
    .await?
}
