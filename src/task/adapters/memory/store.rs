//! In-memory store for task lifecycle tests.
//!
//! Transactions run against a copy of the state that replaces the original
//! only when the unit of work succeeds. The whole store is locked for the
//! duration of a transaction, which is stricter than the row locks of the
//! `PostgreSQL` adapter but yields the same observable outcomes.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::task::{
    domain::{
        AppAcronym, Application, AuditEntry, GroupName, RunningNumber, Task, TaskId, TaskState,
        UserAccount, Username,
    },
    ports::{StoreError, StoreResult, TaskStore, TaskTransaction},
};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<Mutex<InMemoryState>>,
    faults: Arc<Faults>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryState {
    users: HashMap<Username, UserAccount>,
    applications: HashMap<AppAcronym, Application>,
    memberships: BTreeSet<(GroupName, Username)>,
    task_order: Vec<TaskId>,
    tasks: HashMap<TaskId, Task>,
    notes: HashMap<TaskId, Vec<AuditEntry>>,
}

#[derive(Debug, Default)]
struct Faults {
    unavailable: AtomicBool,
    fail_next_append: AtomicBool,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the state lock is poisoned.
    pub fn insert_user(&self, account: UserAccount) -> StoreResult<()> {
        let mut state = self.lock()?;
        state.users.insert(account.username.clone(), account);
        Ok(())
    }

    /// Adds or replaces an application.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the state lock is poisoned.
    pub fn insert_application(&self, application: Application) -> StoreResult<()> {
        let mut state = self.lock()?;
        state
            .applications
            .insert(application.acronym.clone(), application);
        Ok(())
    }

    /// Records that `username` belongs to `group`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the state lock is poisoned.
    pub fn add_member(&self, username: Username, group: GroupName) -> StoreResult<()> {
        let mut state = self.lock()?;
        state.memberships.insert((group, username));
        Ok(())
    }

    /// Stores a task directly, bypassing the lifecycle rules.
    ///
    /// Used to arrange tasks in states the engine does not transition into.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the state lock is poisoned.
    pub fn put_task(&self, task: Task) -> StoreResult<()> {
        let mut state = self.lock()?;
        let id = task.id().clone();
        if state.tasks.insert(id.clone(), task).is_none() {
            state.task_order.push(id);
        }
        Ok(())
    }

    /// Makes every subsequent operation fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes the next audit append fail, aborting its transaction.
    pub fn fail_next_note_append(&self) {
        self.faults.fail_next_append.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, InMemoryState>> {
        self.state
            .lock()
            .map_err(|err| StoreError::unavailable(err.to_string()))
    }

    fn read(&self) -> StoreResult<MutexGuard<'_, InMemoryState>> {
        if self.faults.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store marked unavailable"));
        }
        self.lock()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_user(&self, username: &Username) -> StoreResult<Option<UserAccount>> {
        let state = self.read()?;
        Ok(state.users.get(username).cloned())
    }

    async fn find_application(&self, acronym: &AppAcronym) -> StoreResult<Option<Application>> {
        let state = self.read()?;
        Ok(state.applications.get(acronym).cloned())
    }

    async fn is_member(&self, username: &Username, group: &GroupName) -> StoreResult<bool> {
        let state = self.read()?;
        Ok(state.is_member(username, group))
    }

    async fn group_members(&self, group: &GroupName) -> StoreResult<Vec<Username>> {
        let state = self.read()?;
        Ok(state
            .memberships
            .iter()
            .filter(|(member_group, _)| member_group == group)
            .map(|(_, username)| username.clone())
            .collect())
    }

    async fn find_task(&self, id: &TaskId) -> StoreResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(id).cloned())
    }

    async fn find_by_state(&self, task_state: TaskState) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .task_order
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .filter(|task| task.state() == task_state)
            .cloned()
            .collect())
    }

    async fn audit_trail(&self, id: &TaskId) -> StoreResult<Vec<AuditEntry>> {
        let state = self.read()?;
        let mut entries = state.notes.get(id).cloned().unwrap_or_default();
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }

    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let mut committed = self.read()?;
        let mut working = (*committed).clone();
        let value = work(&mut InMemoryTransaction {
            state: &mut working,
            faults: &self.faults,
        })?;
        *committed = working;
        Ok(value)
    }
}

impl InMemoryState {
    fn is_member(&self, username: &Username, group: &GroupName) -> bool {
        self.memberships
            .contains(&(group.clone(), username.clone()))
    }
}

struct InMemoryTransaction<'a> {
    state: &'a mut InMemoryState,
    faults: &'a Faults,
}

fn missing_row(table: &str, key: &impl std::fmt::Display) -> StoreError {
    StoreError::database(std::io::Error::other(format!(
        "no {table} row for {key}"
    )))
}

impl TaskTransaction for InMemoryTransaction<'_> {
    fn lock_application(&mut self, acronym: &AppAcronym) -> StoreResult<Option<Application>> {
        self.find_application(acronym)
    }

    fn find_application(&mut self, acronym: &AppAcronym) -> StoreResult<Option<Application>> {
        Ok(self.state.applications.get(acronym).cloned())
    }

    fn set_running_number(
        &mut self,
        acronym: &AppAcronym,
        value: RunningNumber,
    ) -> StoreResult<()> {
        let application = self
            .state
            .applications
            .get_mut(acronym)
            .ok_or_else(|| missing_row("application", acronym))?;
        application.running_number = value;
        Ok(())
    }

    fn is_member(&mut self, username: &Username, group: &GroupName) -> StoreResult<bool> {
        Ok(self.state.is_member(username, group))
    }

    fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        if self.state.tasks.contains_key(task.id()) {
            return Err(StoreError::database(std::io::Error::other(format!(
                "duplicate task identifier: {}",
                task.id()
            ))));
        }
        self.state.task_order.push(task.id().clone());
        self.state.tasks.insert(task.id().clone(), task.clone());
        Ok(())
    }

    fn lock_task(&mut self, id: &TaskId) -> StoreResult<Option<Task>> {
        Ok(self.state.tasks.get(id).cloned())
    }

    fn update_task_state(&mut self, id: &TaskId, state: TaskState) -> StoreResult<()> {
        let task = self
            .state
            .tasks
            .remove(id)
            .ok_or_else(|| missing_row("task", id))?;
        let mut data = task.into_persisted();
        data.state = state;
        self.state.tasks.insert(id.clone(), Task::from_persisted(data));
        Ok(())
    }

    fn latest_note_timestamp(&mut self, id: &TaskId) -> StoreResult<Option<NaiveDateTime>> {
        Ok(self
            .state
            .notes
            .get(id)
            .and_then(|entries| entries.iter().map(|entry| entry.date).max()))
    }

    fn append_notes(&mut self, id: &TaskId, entries: &[AuditEntry]) -> StoreResult<()> {
        if self.faults.fail_next_append.swap(false, Ordering::SeqCst) {
            return Err(StoreError::database(std::io::Error::other(
                "injected audit append failure",
            )));
        }
        self.state
            .notes
            .entry(id.clone())
            .or_default()
            .extend_from_slice(entries);
        Ok(())
    }
}
