//! Accounts, applications, and the per-application permits.

use super::{AppAcronym, GroupName, RunningNumber, Username};

/// Stored user account, read-only to the task engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Canonical login name.
    pub username: Username,
    /// Stored password hash.
    pub password_hash: String,
    /// Whether the account has been disabled.
    pub disabled: bool,
    /// Contact address for notifications, if any.
    pub email: Option<String>,
}

/// Action an application permit grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermitAction {
    /// Create tasks under the application.
    Create,
    /// Promote tasks of the application to `done`.
    Done,
}

impl PermitAction {
    /// Returns the canonical name of the permit.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Done => "done",
        }
    }
}

/// Application namespace owning a running number and its permits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    /// Canonical acronym.
    pub acronym: AppAcronym,
    /// Last allocated running number.
    pub running_number: RunningNumber,
    /// Group allowed to create tasks.
    pub permit_create_group: GroupName,
    /// Group allowed to promote tasks to `done`.
    pub permit_done_group: GroupName,
}

impl Application {
    /// Returns the group authorized for `action` on this application.
    #[must_use]
    pub const fn permitted_group(&self, action: PermitAction) -> &GroupName {
        match action {
            PermitAction::Create => &self.permit_create_group,
            PermitAction::Done => &self.permit_done_group,
        }
    }
}
