//! Per-application running-number allocation.
//!
//! The application row is read with a locking read, so concurrent allocators
//! for the same application queue behind the first until it commits or rolls
//! back. Unrelated applications never contend.

use super::error::{LifecycleResult, TaskLifecycleError};
use crate::task::{
    domain::{AppAcronym, RunningNumber, TaskDomainError},
    ports::TaskTransaction,
};

/// Advances and returns the running number of `acronym`.
///
/// Must be called inside an open transaction; the row lock it takes is held
/// until that transaction ends.
///
/// # Errors
///
/// Returns [`TaskLifecycleError::UnknownApplication`] when the application
/// does not exist, [`TaskDomainError::RunningNumberExhausted`] when the
/// counter cannot advance, or the store error of a failed read or write.
pub fn allocate_running_number(
    tx: &mut dyn TaskTransaction,
    acronym: &AppAcronym,
) -> LifecycleResult<RunningNumber> {
    let application = tx
        .lock_application(acronym)?
        .ok_or_else(|| TaskLifecycleError::UnknownApplication(acronym.clone()))?;
    let next = application
        .running_number
        .next()
        .ok_or_else(|| TaskDomainError::RunningNumberExhausted(acronym.to_string()))?;
    tx.set_running_number(acronym, next)?;
    Ok(next)
}
