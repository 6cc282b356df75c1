//! Port contracts for the task lifecycle engine.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod credentials;
pub mod notifier;
pub mod store;

pub use credentials::CredentialVerifier;
pub use notifier::{EmailMessage, Notifier, NotifyError};
pub use store::{StoreError, StoreResult, TaskStore, TaskTransaction};
