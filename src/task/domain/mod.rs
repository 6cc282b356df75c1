//! Domain model for the task lifecycle.
//!
//! The task domain models identifiers, the workflow state machine, the audit
//! trail, and application permits while keeping all infrastructure concerns
//! outside of the domain boundary.

mod access;
mod audit;
mod error;
mod ids;
mod task;
mod transition;

pub use access::{Application, PermitAction, UserAccount};
pub use audit::{AUDIT_DATE_FORMAT, AuditEntry, NoteDraft, NoteKind, stamp_entries};
pub use error::{ParseTaskStateError, TaskDomainError};
pub use ids::{AppAcronym, GroupName, RunningNumber, TaskId, TaskName, Username};
pub use task::{PersistedTaskData, Task};
pub use transition::{TRANSITIONS, TaskAction, TaskState, Transition};
