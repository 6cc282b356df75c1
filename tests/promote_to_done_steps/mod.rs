//! Step definitions for promote-to-done scenarios.

pub mod then;
pub mod world;
