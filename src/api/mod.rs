//! HTTP surface for the task actions.
//!
//! Bodies are read as raw JSON objects so that missing and undeclared fields
//! can be reported separately. Every response carries a stable `code`:
//! `S000` on success, or one of the error codes of [`status_and_code`].

mod error;
mod routes;

pub use error::{ApiError, ApiErrorBody, UNKNOWN_ROUTE_CODE, status_and_code};
pub use routes::{AppState, router};
