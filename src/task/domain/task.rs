//! Task aggregate root.

use super::{AppAcronym, TaskAction, TaskDomainError, TaskId, TaskName, TaskState, Username};
use chrono::{NaiveDateTime, SubsecRound};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: TaskName,
    description: Option<String>,
    state: TaskState,
    creator: Username,
    owner: Username,
    created_at: NaiveDateTime,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task name.
    pub name: TaskName,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted workflow state.
    pub state: TaskState,
    /// User who created the task.
    pub creator: Username,
    /// User currently owning the task.
    pub owner: Username,
    /// Persisted creation timestamp.
    pub created_at: NaiveDateTime,
}

impl Task {
    /// Creates a task in the initial state, owned by its creator.
    #[must_use]
    pub fn create(
        id: TaskId,
        name: TaskName,
        description: Option<String>,
        creator: Username,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            name,
            description,
            state: TaskState::INITIAL,
            owner: creator.clone(),
            creator,
            created_at: clock.utc().naive_utc().trunc_subsecs(0),
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            description: data.description,
            state: data.state,
            creator: data.creator,
            owner: data.owner,
            created_at: data.created_at,
        }
    }

    /// Decomposes the task into its persisted representation.
    #[must_use]
    pub fn into_persisted(self) -> PersistedTaskData {
        PersistedTaskData {
            id: self.id,
            name: self.name,
            description: self.description,
            state: self.state,
            creator: self.creator,
            owner: self.owner,
            created_at: self.created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the owning application acronym.
    #[must_use]
    pub const fn application(&self) -> &AppAcronym {
        self.id.acronym()
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the workflow state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the user who created the task.
    #[must_use]
    pub const fn creator(&self) -> &Username {
        &self.creator
    }

    /// Returns the user owning the task.
    #[must_use]
    pub const fn owner(&self) -> &Username {
        &self.owner
    }

    /// Returns the creation timestamp (UTC, second precision).
    #[must_use]
    pub const fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Applies `action` through the transition table.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] and leaves the state
    /// untouched when the table has no row for the current state and action.
    pub fn apply(&mut self, action: TaskAction) -> Result<TaskState, TaskDomainError> {
        let next = self
            .state
            .apply(action)
            .ok_or_else(|| TaskDomainError::InvalidTransition {
                task_id: self.id.clone(),
                from: self.state,
                action,
            })?;
        self.state = next;
        Ok(next)
    }
}
