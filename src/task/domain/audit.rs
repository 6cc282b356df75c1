//! Audit trail entries recorded against tasks.
//!
//! Entries are persisted with second precision. Ordering is recovered purely
//! from timestamps, so [`stamp_entries`] spaces the entries of one batch a
//! second apart and never stamps a batch earlier than the latest entry the
//! task already has.

use super::{TaskState, Username};
use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Persisted textual form of audit timestamps.
pub const AUDIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Origin of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Generated by the engine to describe a state change.
    System,
    /// Free text supplied by the acting user.
    User,
}

/// One immutable audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// User who caused the entry.
    pub user: Username,
    /// Task state at the time of the entry.
    pub state: TaskState,
    /// Wall-clock time of the entry (UTC, second precision).
    #[serde(with = "audit_date")]
    pub date: NaiveDateTime,
    /// Entry text.
    pub message: String,
    /// Entry origin.
    #[serde(rename = "type")]
    pub kind: NoteKind,
}

/// Audit entry awaiting its timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    user: Username,
    state: TaskState,
    message: String,
    kind: NoteKind,
}

impl NoteDraft {
    /// Drafts an engine-generated entry.
    #[must_use]
    pub fn system(user: Username, state: TaskState, message: impl Into<String>) -> Self {
        Self {
            user,
            state,
            message: message.into(),
            kind: NoteKind::System,
        }
    }

    /// Drafts an entry carrying user-supplied text.
    #[must_use]
    pub fn user(user: Username, state: TaskState, message: impl Into<String>) -> Self {
        Self {
            user,
            state,
            message: message.into(),
            kind: NoteKind::User,
        }
    }

    fn into_entry(self, date: NaiveDateTime) -> AuditEntry {
        AuditEntry {
            user: self.user,
            state: self.state,
            date,
            message: self.message,
            kind: self.kind,
        }
    }
}

/// Assigns timestamps to a batch of drafts, preserving their order.
///
/// The first entry is stamped with `now` truncated to whole seconds. When
/// the task already holds an entry at or after that second, the first entry
/// is stamped one second after `floor` instead. Each following entry is
/// stamped one second after its predecessor, so a task's trail is strictly
/// increasing across batches.
#[must_use]
pub fn stamp_entries(
    drafts: Vec<NoteDraft>,
    now: DateTime<Utc>,
    floor: Option<NaiveDateTime>,
) -> Vec<AuditEntry> {
    let now = now.naive_utc().trunc_subsecs(0);
    let mut current = match floor {
        Some(latest) if latest >= now => next_second(latest),
        _ => now,
    };
    let mut entries = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        if index > 0 {
            current = next_second(current);
        }
        entries.push(draft.into_entry(current));
    }
    entries
}

fn next_second(date: NaiveDateTime) -> NaiveDateTime {
    date.checked_add_signed(TimeDelta::seconds(1)).unwrap_or(date)
}

mod audit_date {
    use super::AUDIT_DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(AUDIT_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, AUDIT_DATE_FORMAT).map_err(D::Error::custom)
    }
}
