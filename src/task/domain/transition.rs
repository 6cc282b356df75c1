//! Task workflow states and the transition table.
//!
//! Legal moves are listed in [`TRANSITIONS`] as `(from, action) -> to`
//! triples. Adding a workflow step means adding a row here and an action
//! variant; no caller needs to change.

use super::ParseTaskStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task has been created and awaits release.
    Open,
    /// Task has been released for work.
    Todo,
    /// Task is being worked on.
    Doing,
    /// Task work has been submitted as finished.
    Done,
    /// Task has been closed.
    Closed,
}

impl TaskState {
    /// State assigned to every newly created task.
    pub const INITIAL: Self = Self::Open;

    /// Every workflow state, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::Todo,
        Self::Doing,
        Self::Done,
        Self::Closed,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Closed => "closed",
        }
    }

    /// Returns the state reached by applying `action`, if the table allows it.
    #[must_use]
    pub fn apply(self, action: TaskAction) -> Option<Self> {
        TRANSITIONS
            .iter()
            .find(|transition| transition.from == self && transition.action == action)
            .map(|transition| transition.to)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Action that moves an existing task between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// Submit finished work, moving the task from `doing` to `done`.
    PromoteToDone,
}

impl TaskAction {
    /// Returns the canonical name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PromoteToDone => "promote_to_done",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Required current state.
    pub from: TaskState,
    /// Action being applied.
    pub action: TaskAction,
    /// Resulting state.
    pub to: TaskState,
}

/// Allow-list of every legal state transition.
pub const TRANSITIONS: &[Transition] = &[Transition {
    from: TaskState::Doing,
    action: TaskAction::PromoteToDone,
    to: TaskState::Done,
}];
