//! HTTP error responses.

use crate::task::services::{LifecycleErrorKind, TaskLifecycleError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Stable code returned for requests to unknown routes.
pub const UNKNOWN_ROUTE_CODE: &str = "E_VU1";

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Stable error code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

/// Error returned by HTTP handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error response.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Creates the response for an unknown route.
    #[must_use]
    pub fn unknown_route() -> Self {
        Self::new(StatusCode::NOT_FOUND, UNKNOWN_ROUTE_CODE, "unknown route")
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

/// Returns the HTTP status and stable code for a failure kind.
#[must_use]
pub const fn status_and_code(kind: LifecycleErrorKind) -> (StatusCode, &'static str) {
    match kind {
        LifecycleErrorKind::UnexpectedFields => (StatusCode::BAD_REQUEST, "E_SP1"),
        LifecycleErrorKind::MissingFields => (StatusCode::BAD_REQUEST, "E_SP2"),
        LifecycleErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, "E_SP3"),
        LifecycleErrorKind::AuthUnknownUser => (StatusCode::UNAUTHORIZED, "E_AU1"),
        LifecycleErrorKind::AuthBadCredential => (StatusCode::UNAUTHORIZED, "E_AU2"),
        LifecycleErrorKind::AuthDisabled => (StatusCode::FORBIDDEN, "E_AU3"),
        LifecycleErrorKind::Forbidden => (StatusCode::FORBIDDEN, "E_AR1"),
        LifecycleErrorKind::UnknownApplication => (StatusCode::BAD_REQUEST, "E_TE2"),
        LifecycleErrorKind::TaskNotFound => (StatusCode::NOT_FOUND, "E_TE3"),
        LifecycleErrorKind::InvalidTransition => (StatusCode::BAD_REQUEST, "E_TE4"),
        LifecycleErrorKind::PersistenceUnavailable => {
            (StatusCode::INTERNAL_SERVER_ERROR, "E_TE5")
        }
        LifecycleErrorKind::PersistenceDenied => (StatusCode::INTERNAL_SERVER_ERROR, "E_TE6"),
        LifecycleErrorKind::DataTooLong => (StatusCode::BAD_REQUEST, "E_TE7"),
        LifecycleErrorKind::PersistenceError => (StatusCode::INTERNAL_SERVER_ERROR, "E_TE1"),
    }
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        let kind = err.kind();
        let (status, code) = status_and_code(kind);
        if status.is_server_error() {
            error!(code, error = %err, "request failed in the store");
            // Store details stay in the log.
            return Self::new(status, code, "persistence failure");
        }
        debug!(code, error = %err, "request rejected");
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                code: self.code.to_owned(),
                message: self.message,
            }),
        )
            .into_response()
    }
}
