//! `PostgreSQL` adapters for task lifecycle persistence.

mod errors;
mod models;
mod schema;
mod store;

pub use store::{PostgresTaskStore, TaskPgPool};
