//! Store port for accounts, applications, tasks, and their audit trail.
//!
//! Reads that need no isolation beyond the store default live on
//! [`TaskStore`]. Mutations run through [`TaskStore::transaction`], which hands
//! a [`TaskTransaction`] to a synchronous unit of work: the work either
//! returns `Ok` and is committed, or returns `Err` and is rolled back in full.

use crate::task::domain::{
    AppAcronym, Application, AuditEntry, GroupName, RunningNumber, Task, TaskId, TaskState,
    UserAccount, Username,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract of the task engine.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Finds a user account by canonical username.
    async fn find_user(&self, username: &Username) -> StoreResult<Option<UserAccount>>;

    /// Finds an application by canonical acronym.
    async fn find_application(&self, acronym: &AppAcronym) -> StoreResult<Option<Application>>;

    /// Returns whether `username` belongs to `group`.
    async fn is_member(&self, username: &Username, group: &GroupName) -> StoreResult<bool>;

    /// Returns every member of `group`, including placeholder rows.
    async fn group_members(&self, group: &GroupName) -> StoreResult<Vec<Username>>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: &TaskId) -> StoreResult<Option<Task>>;

    /// Returns all tasks currently in `state`, in store order.
    async fn find_by_state(&self, state: TaskState) -> StoreResult<Vec<Task>>;

    /// Returns the audit trail of a task in timestamp order.
    async fn audit_trail(&self, id: &TaskId) -> StoreResult<Vec<AuditEntry>>;

    /// Runs `work` inside one transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back on
    /// `Err`. The connection is released on every exit path.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`StoreError`] converted
    /// into `E` when the transaction cannot be opened or committed.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static;
}

/// Row-level operations that are only valid inside an open transaction.
pub trait TaskTransaction {
    /// Reads an application and locks its row until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the read fails.
    fn lock_application(&mut self, acronym: &AppAcronym) -> StoreResult<Option<Application>>;

    /// Reads an application without locking its row.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the read fails.
    fn find_application(&mut self, acronym: &AppAcronym) -> StoreResult<Option<Application>>;

    /// Stores a new running number for a locked application row.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the update fails.
    fn set_running_number(
        &mut self,
        acronym: &AppAcronym,
        value: RunningNumber,
    ) -> StoreResult<()>;

    /// Returns whether `username` belongs to `group`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the read fails.
    fn is_member(&mut self, username: &Username, group: &GroupName) -> StoreResult<bool>;

    /// Inserts a new task row.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the insert fails, including when the
    /// identifier already exists.
    fn insert_task(&mut self, task: &Task) -> StoreResult<()>;

    /// Reads a task and locks its row until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the read fails.
    fn lock_task(&mut self, id: &TaskId) -> StoreResult<Option<Task>>;

    /// Stores a new state for a locked task row.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the update fails.
    fn update_task_state(&mut self, id: &TaskId, state: TaskState) -> StoreResult<()>;

    /// Returns the timestamp of the latest audit entry of a task.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the read fails.
    fn latest_note_timestamp(&mut self, id: &TaskId) -> StoreResult<Option<NaiveDateTime>>;

    /// Appends audit entries to a task's trail, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the insert fails.
    fn append_notes(&mut self, id: &TaskId, entries: &[AuditEntry]) -> StoreResult<()>;
}

/// Errors returned by store implementations.
///
/// Native store failures are classified into this fixed vocabulary so that
/// callers never see store-specific codes.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached or the connection was lost.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the configured credentials or privileges.
    #[error("store access denied: {0}")]
    AccessDenied(String),

    /// A value exceeded its column size.
    #[error("value too long: {0}")]
    DataTooLong(String),

    /// Stored data could not be mapped back into domain values.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),

    /// Any other persistence-layer failure.
    #[error("persistence error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a generic persistence error.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Creates an unavailability error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a corrupt-data error.
    pub fn corrupt(message: impl ToString) -> Self {
        Self::Corrupt(message.to_string())
    }
}
