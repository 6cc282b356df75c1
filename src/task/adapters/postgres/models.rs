//! Diesel row models for task lifecycle persistence.

use super::schema::{applications, task_notes, tasks, users};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for user accounts.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Canonical login name.
    pub username: String,
    /// bcrypt password hash.
    pub password_hash: String,
    /// Whether the account is disabled.
    pub disabled: bool,
    /// Contact address.
    pub email: Option<String>,
}

/// Query result row for applications.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    /// Canonical acronym.
    pub acronym: String,
    /// Last allocated running number.
    pub running_number: i64,
    /// Group allowed to create tasks.
    pub permit_create_group: String,
    /// Group allowed to promote tasks to done.
    pub permit_done_group: String,
}

/// Query result row for tasks.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub task_id: String,
    /// Canonical task name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Workflow state.
    pub state: String,
    /// Owning application acronym.
    pub app_acronym: String,
    /// Creator username.
    pub creator: String,
    /// Owner username.
    pub owner: String,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub task_id: String,
    /// Canonical task name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Workflow state.
    pub state: String,
    /// Owning application acronym.
    pub app_acronym: String,
    /// Creator username.
    pub creator: String,
    /// Owner username.
    pub owner: String,
    /// Creation timestamp.
    pub created_at: NaiveDateTime,
}

/// Insert model for audit batches.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_notes)]
pub struct NewTaskNoteRow {
    /// Task the batch belongs to.
    pub task_id: String,
    /// Timestamp of the latest entry in the batch.
    pub created_at: NaiveDateTime,
    /// JSON array of audit entries.
    pub notes: Value,
}
