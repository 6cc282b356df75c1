//! Taskboard: a transactional task tracking engine.
//!
//! Authenticated users create tasks under an application namespace, list
//! tasks by workflow state, and promote tasks from `doing` to `done`. Task
//! identifiers are allocated per application under a row lock, every state
//! change is recorded in an ordered audit trail, and promotions notify the
//! application's done group after commit.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, credentials, notifications)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle domain, ports, adapters, and services
//! - [`api`]: HTTP routes for the task actions
//! - [`config`]: Environment configuration
//! - [`observability`]: Logging initialisation

pub mod api;
pub mod config;
pub mod observability;
pub mod task;
