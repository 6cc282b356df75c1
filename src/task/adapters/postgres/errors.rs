//! Classification of Diesel and pool failures into [`StoreError`].
//!
//! Diesel does not expose `SQLSTATE` codes, so the few conditions callers
//! need to distinguish are recognised from the server message.

use crate::task::ports::StoreError;
use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

const ACCESS_DENIED_MARKERS: [&str; 3] = [
    "password authentication failed",
    "permission denied",
    "no pg_hba.conf entry",
];

fn is_access_denied(message: &str) -> bool {
    ACCESS_DENIED_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

fn classify(err: &DieselError) -> Option<StoreError> {
    match err {
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            info,
        ) => Some(StoreError::unavailable(info.message())),
        DieselError::DatabaseError(_, info) if info.message().starts_with("value too long") => {
            Some(StoreError::DataTooLong(info.message().to_owned()))
        }
        DieselError::DatabaseError(_, info) if is_access_denied(info.message()) => {
            Some(StoreError::AccessDenied(info.message().to_owned()))
        }
        DieselError::DeserializationError(cause) => Some(StoreError::corrupt(cause)),
        _ => None,
    }
}

/// Maps a Diesel error onto the store vocabulary.
pub(super) fn map_diesel_error(err: DieselError) -> StoreError {
    classify(&err).unwrap_or_else(|| StoreError::database(err))
}

/// Maps a connection pool checkout failure onto the store vocabulary.
pub(super) fn map_pool_error(err: &PoolError) -> StoreError {
    let message = err.to_string();
    if is_access_denied(&message) {
        StoreError::AccessDenied(message)
    } else {
        StoreError::Unavailable(message)
    }
}
