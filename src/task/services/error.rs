//! Service-level error taxonomy for task lifecycle operations.

use crate::task::{
    domain::{AppAcronym, GroupName, ParseTaskStateError, TaskDomainError, TaskId, Username},
    ports::StoreError,
};
use thiserror::Error;

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Required payload fields are absent or empty.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// The payload carries fields outside the declared set.
    #[error("unexpected fields: {}", .0.join(", "))]
    UnexpectedFields(Vec<String>),

    /// A field value is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Domain validation or a state transition failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// No account exists for the supplied username.
    #[error("unknown user")]
    AuthUnknownUser,

    /// The supplied password does not match the account.
    #[error("invalid credentials")]
    AuthBadCredential,

    /// The account has been disabled.
    #[error("account is disabled")]
    AuthDisabled,

    /// No application exists for the acronym.
    #[error("unknown application: {0}")]
    UnknownApplication(AppAcronym),

    /// The user is not a member of the group the permit requires.
    #[error("user {username} is not a member of group {group}")]
    Forbidden {
        /// Acting user.
        username: Username,
        /// Group the permit requires.
        group: GroupName,
    },

    /// No task exists for the identifier.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ParseTaskStateError> for TaskLifecycleError {
    fn from(err: ParseTaskStateError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type for task lifecycle service operations.
pub type LifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Flat classification of lifecycle failures, stable across store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleErrorKind {
    /// Required fields are missing.
    MissingFields,
    /// Undeclared fields are present.
    UnexpectedFields,
    /// A value is blank or malformed.
    InvalidInput,
    /// Unknown username.
    AuthUnknownUser,
    /// Wrong password.
    AuthBadCredential,
    /// Disabled account.
    AuthDisabled,
    /// Unknown application acronym.
    UnknownApplication,
    /// Not a member of the permitted group.
    Forbidden,
    /// Unknown task identifier.
    TaskNotFound,
    /// Illegal state transition.
    InvalidTransition,
    /// The store is unreachable.
    PersistenceUnavailable,
    /// The store refused access.
    PersistenceDenied,
    /// A value does not fit its column.
    DataTooLong,
    /// Any other store failure.
    PersistenceError,
}

impl TaskLifecycleError {
    /// Returns the flat classification of this error.
    #[must_use]
    pub const fn kind(&self) -> LifecycleErrorKind {
        match self {
            Self::MissingFields(_) => LifecycleErrorKind::MissingFields,
            Self::UnexpectedFields(_) => LifecycleErrorKind::UnexpectedFields,
            Self::InvalidInput(_)
            | Self::Domain(TaskDomainError::BlankValue { .. } | TaskDomainError::InvalidTaskId(_)) => {
                LifecycleErrorKind::InvalidInput
            }
            Self::Domain(TaskDomainError::InvalidTransition { .. }) => {
                LifecycleErrorKind::InvalidTransition
            }
            Self::Domain(TaskDomainError::RunningNumberExhausted(_)) => {
                LifecycleErrorKind::PersistenceError
            }
            Self::AuthUnknownUser => LifecycleErrorKind::AuthUnknownUser,
            Self::AuthBadCredential => LifecycleErrorKind::AuthBadCredential,
            Self::AuthDisabled => LifecycleErrorKind::AuthDisabled,
            Self::UnknownApplication(_) => LifecycleErrorKind::UnknownApplication,
            Self::Forbidden { .. } => LifecycleErrorKind::Forbidden,
            Self::TaskNotFound(_) => LifecycleErrorKind::TaskNotFound,
            Self::Store(StoreError::Unavailable(_)) => LifecycleErrorKind::PersistenceUnavailable,
            Self::Store(StoreError::AccessDenied(_)) => LifecycleErrorKind::PersistenceDenied,
            Self::Store(StoreError::DataTooLong(_)) => LifecycleErrorKind::DataTooLong,
            Self::Store(StoreError::Corrupt(_) | StoreError::Database(_)) => {
                LifecycleErrorKind::PersistenceError
            }
        }
    }
}
