//! Identifier and validated scalar types for the task domain.
//!
//! Usernames, application acronyms, and task names are case-insensitive keys.
//! Their constructors trim and lower-case the input exactly once, so every
//! value held by one of these types is already canonical.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

fn canonical_key(value: &str, field: &'static str) -> Result<String, TaskDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::BlankValue { field });
    }
    Ok(trimmed.to_lowercase())
}

macro_rules! string_newtype_common {
    ($name:ident) => {
        impl $name {
            /// Returns the canonical value as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// Case-insensitive login name of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a canonical (trimmed, lower-cased) username.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankValue`] when the value is blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        canonical_key(value.as_ref(), "username").map(Self)
    }
}

string_newtype_common!(Username);

/// Case-insensitive application acronym, the namespace for task identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppAcronym(String);

impl AppAcronym {
    /// Creates a canonical (trimmed, lower-cased) application acronym.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankValue`] when the value is blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        canonical_key(value.as_ref(), "app_acronym").map(Self)
    }
}

string_newtype_common!(AppAcronym);

/// Case-insensitive task name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskName(String);

impl TaskName {
    /// Creates a canonical (trimmed, lower-cased) task name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankValue`] when the value is blank or
    /// whitespace-only.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        canonical_key(value.as_ref(), "task_name").map(Self)
    }
}

string_newtype_common!(TaskName);

/// Name of a user group referenced by application permits.
///
/// Group names are stored verbatim apart from surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(String);

impl GroupName {
    /// Creates a group name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlankValue`] when the value is blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::BlankValue { field: "group_name" });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

string_newtype_common!(GroupName);

/// Per-application task counter value.
///
/// Zero is the value of an application that has not allocated any task yet;
/// allocated task numbers start at one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunningNumber(u64);

impl RunningNumber {
    /// Counter value of an application without tasks.
    pub const ZERO: Self = Self(0);

    /// Largest value representable in the current `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// Creates a running number.
    ///
    /// Returns `None` when the value exceeds the schema-backed maximum
    /// (`i64::MAX`).
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        if value > Self::MAX_PERSISTED_VALUE {
            return None;
        }
        Some(Self(value))
    }

    /// Returns the successor value, or `None` once the counter is exhausted.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Self::new(value),
            None => None,
        }
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunningNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task identifier in `<acronym>_<number>` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    acronym: AppAcronym,
    number: RunningNumber,
}

impl TaskId {
    /// Builds the identifier for an allocated running number.
    #[must_use]
    pub const fn new(acronym: AppAcronym, number: RunningNumber) -> Self {
        Self { acronym, number }
    }

    /// Parses an identifier, normalizing its case.
    ///
    /// The acronym part may itself contain underscores; the number is taken
    /// from the last segment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskId`] when the value has no
    /// acronym, no number, or a number below one.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let raw = value.as_ref();
        let invalid = || TaskDomainError::InvalidTaskId(raw.to_owned());
        let (acronym, number) = raw.trim().rsplit_once('_').ok_or_else(invalid)?;
        let acronym = AppAcronym::new(acronym).map_err(|_| invalid())?;
        let number = number
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .and_then(RunningNumber::new)
            .ok_or_else(invalid)?;
        Ok(Self { acronym, number })
    }

    /// Returns the owning application acronym.
    #[must_use]
    pub const fn acronym(&self) -> &AppAcronym {
        &self.acronym
    }

    /// Returns the allocated running number.
    #[must_use]
    pub const fn number(&self) -> RunningNumber {
        self.number
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.acronym, self.number)
    }
}

impl TryFrom<String> for TaskId {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TaskId> for String {
    fn from(value: TaskId) -> Self {
        value.to_string()
    }
}
