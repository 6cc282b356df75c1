//! Task lifecycle management.
//!
//! Tasks are created under an application namespace with a sequential
//! identifier, listed by workflow state, and promoted from `doing` to `done`.
//! Every mutation appends to the task's audit trail in the same transaction,
//! and promotions notify the application's done group once committed. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
