//! Adapter implementations of the task ports.

pub mod credentials;
pub mod logging;
pub mod memory;
pub mod postgres;
