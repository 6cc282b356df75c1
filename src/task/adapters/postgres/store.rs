//! `PostgreSQL` store implementation for task lifecycle persistence.

use super::{
    errors::{map_diesel_error, map_pool_error},
    models::{ApplicationRow, NewTaskNoteRow, NewTaskRow, TaskRow, UserRow},
    schema::{applications, task_notes, tasks, user_groups, users},
};
use crate::task::{
    domain::{
        AppAcronym, Application, AuditEntry, GroupName, PersistedTaskData, RunningNumber, Task,
        TaskId, TaskName, TaskState, UserAccount, Username,
    },
    ports::{StoreError, StoreResult, TaskStore, TaskTransaction},
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::dsl::{exists, max};
use diesel::helper_types::{AsSelect, Find, Select};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use serde_json::Value;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(|err| map_pool_error(&err))?;
            f(&mut connection)
        })
        .await
        .map_err(|err| StoreError::unavailable(format!("task join error: {err}")))?
    }
}

/// Failure of a transactional unit of work.
///
/// Keeps the caller's error apart from failures to open or commit the
/// transaction so both can be handed back without loss.
enum TxFailure<E> {
    Work(E),
    Store(StoreError),
}

impl<E> From<DieselError> for TxFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Store(map_diesel_error(err))
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn find_user(&self, username: &Username) -> StoreResult<Option<UserAccount>> {
        let key = username.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .find(key)
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(map_diesel_error)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_application(&self, acronym: &AppAcronym) -> StoreResult<Option<Application>> {
        let key = acronym.as_str().to_owned();
        self.run_blocking(move |connection| load_application(connection, &key, false))
            .await
    }

    async fn is_member(&self, username: &Username, group: &GroupName) -> StoreResult<bool> {
        let username = username.as_str().to_owned();
        let group = group.as_str().to_owned();
        self.run_blocking(move |connection| membership_exists(connection, &username, &group))
            .await
    }

    async fn group_members(&self, group: &GroupName) -> StoreResult<Vec<Username>> {
        let group = group.as_str().to_owned();
        self.run_blocking(move |connection| {
            let names = user_groups::table
                .filter(user_groups::group_name.eq(group))
                .order(user_groups::username.asc())
                .select(user_groups::username)
                .load::<String>(connection)
                .map_err(map_diesel_error)?;
            // Blank membership rows carry no member and are not errors.
            Ok(names
                .into_iter()
                .filter_map(|name| Username::new(name).ok())
                .collect())
        })
        .await
    }

    async fn find_task(&self, id: &TaskId) -> StoreResult<Option<Task>> {
        let key = id.to_string();
        self.run_blocking(move |connection| load_task(connection, &key, false))
            .await
    }

    async fn find_by_state(&self, state: TaskState) -> StoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            tasks::table
                .filter(tasks::state.eq(state.as_str()))
                .order((tasks::created_at.asc(), tasks::task_id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(map_diesel_error)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn audit_trail(&self, id: &TaskId) -> StoreResult<Vec<AuditEntry>> {
        let key = id.to_string();
        self.run_blocking(move |connection| {
            let batches = task_notes::table
                .filter(task_notes::task_id.eq(key))
                .order((task_notes::created_at.asc(), task_notes::id.asc()))
                .select(task_notes::notes)
                .load::<Value>(connection)
                .map_err(map_diesel_error)?;

            let mut entries = Vec::new();
            for batch in batches {
                let decoded: Vec<AuditEntry> =
                    serde_json::from_value(batch).map_err(StoreError::corrupt)?;
                entries.extend(decoded);
            }
            entries.sort_by_key(|entry| entry.date);
            Ok(entries)
        })
        .await
    }

    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let outcome = tokio::task::spawn_blocking(move || -> Result<T, TxFailure<E>> {
            let mut pooled = pool
                .get()
                .map_err(|err| TxFailure::Store(map_pool_error(&err)))?;
            let connection: &mut PgConnection = &mut pooled;
            connection.transaction(|conn| {
                let mut tx = PgTaskTransaction { conn };
                work(&mut tx).map_err(TxFailure::Work)
            })
        })
        .await;

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(TxFailure::Work(err))) => Err(err),
            Ok(Err(TxFailure::Store(err))) => Err(E::from(err)),
            Err(join) => Err(E::from(StoreError::unavailable(format!(
                "task join error: {join}"
            )))),
        }
    }
}

/// Transaction-scoped operations over one pooled connection.
struct PgTaskTransaction<'c> {
    conn: &'c mut PgConnection,
}

impl TaskTransaction for PgTaskTransaction<'_> {
    fn lock_application(&mut self, acronym: &AppAcronym) -> StoreResult<Option<Application>> {
        load_application(self.conn, acronym.as_str(), true)
    }

    fn find_application(&mut self, acronym: &AppAcronym) -> StoreResult<Option<Application>> {
        load_application(self.conn, acronym.as_str(), false)
    }

    fn set_running_number(
        &mut self,
        acronym: &AppAcronym,
        value: RunningNumber,
    ) -> StoreResult<()> {
        let stored = i64::try_from(value.value()).map_err(StoreError::corrupt)?;
        diesel::update(applications::table.find(acronym.as_str()))
            .set(applications::running_number.eq(stored))
            .execute(self.conn)
            .map_err(map_diesel_error)?;
        Ok(())
    }

    fn is_member(&mut self, username: &Username, group: &GroupName) -> StoreResult<bool> {
        membership_exists(self.conn, username.as_str(), group.as_str())
    }

    fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        diesel::insert_into(tasks::table)
            .values(&to_new_row(task))
            .execute(self.conn)
            .map_err(map_diesel_error)?;
        Ok(())
    }

    fn lock_task(&mut self, id: &TaskId) -> StoreResult<Option<Task>> {
        load_task(self.conn, &id.to_string(), true)
    }

    fn update_task_state(&mut self, id: &TaskId, state: TaskState) -> StoreResult<()> {
        let updated = diesel::update(tasks::table.find(id.to_string()))
            .set(tasks::state.eq(state.as_str()))
            .execute(self.conn)
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(StoreError::database(DieselError::NotFound));
        }
        Ok(())
    }

    fn latest_note_timestamp(&mut self, id: &TaskId) -> StoreResult<Option<NaiveDateTime>> {
        task_notes::table
            .filter(task_notes::task_id.eq(id.to_string()))
            .select(max(task_notes::created_at))
            .first::<Option<NaiveDateTime>>(self.conn)
            .map_err(map_diesel_error)
    }

    fn append_notes(&mut self, id: &TaskId, entries: &[AuditEntry]) -> StoreResult<()> {
        let Some(latest) = entries.iter().map(|entry| entry.date).max() else {
            return Ok(());
        };
        let row = NewTaskNoteRow {
            task_id: id.to_string(),
            created_at: latest,
            notes: serde_json::to_value(entries).map_err(StoreError::database)?,
        };
        diesel::insert_into(task_notes::table)
            .values(&row)
            .execute(self.conn)
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

type ApplicationQuery<'a> =
    Select<Find<applications::table, &'a str>, AsSelect<ApplicationRow, Pg>>;
type TaskQuery<'a> = Select<Find<tasks::table, &'a str>, AsSelect<TaskRow, Pg>>;

fn application_by_acronym(acronym: &str) -> ApplicationQuery<'_> {
    applications::table
        .find(acronym)
        .select(ApplicationRow::as_select())
}

fn task_by_id(id: &str) -> TaskQuery<'_> {
    tasks::table.find(id).select(TaskRow::as_select())
}

fn load_application(
    connection: &mut PgConnection,
    acronym: &str,
    lock: bool,
) -> StoreResult<Option<Application>> {
    let query = application_by_acronym(acronym);
    let row = if lock {
        query.for_update().first::<ApplicationRow>(connection)
    } else {
        query.first::<ApplicationRow>(connection)
    }
    .optional()
    .map_err(map_diesel_error)?;
    row.map(row_to_application).transpose()
}

fn load_task(connection: &mut PgConnection, id: &str, lock: bool) -> StoreResult<Option<Task>> {
    let query = task_by_id(id);
    let row = if lock {
        query.for_update().first::<TaskRow>(connection)
    } else {
        query.first::<TaskRow>(connection)
    }
    .optional()
    .map_err(map_diesel_error)?;
    row.map(row_to_task).transpose()
}

fn membership_exists(
    connection: &mut PgConnection,
    username: &str,
    group: &str,
) -> StoreResult<bool> {
    diesel::select(exists(
        user_groups::table
            .filter(user_groups::username.eq(username))
            .filter(user_groups::group_name.eq(group)),
    ))
    .get_result::<bool>(connection)
    .map_err(map_diesel_error)
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        task_id: task.id().to_string(),
        name: task.name().as_str().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        state: task.state().as_str().to_owned(),
        app_acronym: task.application().as_str().to_owned(),
        creator: task.creator().as_str().to_owned(),
        owner: task.owner().as_str().to_owned(),
        created_at: task.created_at(),
    }
}

fn row_to_user(row: UserRow) -> StoreResult<UserAccount> {
    Ok(UserAccount {
        username: Username::new(row.username).map_err(StoreError::corrupt)?,
        password_hash: row.password_hash,
        disabled: row.disabled,
        email: row.email,
    })
}

fn row_to_application(row: ApplicationRow) -> StoreResult<Application> {
    let number = u64::try_from(row.running_number)
        .ok()
        .and_then(RunningNumber::new)
        .ok_or_else(|| {
            StoreError::corrupt(format!(
                "application {} has invalid running number {}",
                row.acronym, row.running_number
            ))
        })?;
    Ok(Application {
        acronym: AppAcronym::new(&row.acronym).map_err(StoreError::corrupt)?,
        running_number: number,
        permit_create_group: GroupName::new(row.permit_create_group)
            .map_err(StoreError::corrupt)?,
        permit_done_group: GroupName::new(row.permit_done_group).map_err(StoreError::corrupt)?,
    })
}

fn row_to_task(row: TaskRow) -> StoreResult<Task> {
    let TaskRow {
        task_id,
        name,
        description,
        state,
        app_acronym,
        creator,
        owner,
        created_at,
    } = row;

    let id = TaskId::parse(&task_id).map_err(StoreError::corrupt)?;
    if id.acronym().as_str() != app_acronym {
        return Err(StoreError::corrupt(format!(
            "task {id} is stored under application {app_acronym}"
        )));
    }

    Ok(Task::from_persisted(PersistedTaskData {
        id,
        name: TaskName::new(name).map_err(StoreError::corrupt)?,
        description,
        state: TaskState::try_from(state.as_str()).map_err(StoreError::corrupt)?,
        creator: Username::new(creator).map_err(StoreError::corrupt)?,
        owner: Username::new(owner).map_err(StoreError::corrupt)?,
        created_at,
    }))
}
