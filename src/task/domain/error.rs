//! Error types for task domain validation, parsing, and transitions.

use super::{TaskAction, TaskId, TaskState};
use thiserror::Error;

/// Errors returned while constructing domain values or applying transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// A required identifier or name is empty after trimming.
    #[error("{field} must not be blank")]
    BlankValue {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The task identifier does not follow `<acronym>_<number>`.
    #[error("invalid task identifier '{0}', expected <acronym>_<number>")]
    InvalidTaskId(String),

    /// The application running number cannot be advanced any further.
    #[error("running number exhausted for application {0}")]
    RunningNumberExhausted(String),

    /// The requested action is not legal from the task's current state.
    #[error("task {task_id} cannot {action} from state {from}")]
    InvalidTransition {
        /// Task the transition was attempted on.
        task_id: TaskId,
        /// State the task was in when the action was attempted.
        from: TaskState,
        /// Action that was rejected.
        action: TaskAction,
    },
}

/// Error returned while parsing task states from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);
