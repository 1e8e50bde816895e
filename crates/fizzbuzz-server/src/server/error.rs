//! Error types for the HTTP service.
//!
//! [`ApiError`] covers every way a request can be refused. It converts into an
//! axum response with the matching status code and a `{"error": "..."}` body.
//!
//! ## Error Cases
//! - `InvalidParameters`: the query string could not be decoded (e.g. a
//!   non-numeric `int1`).
//! - `Validation`: the parameters decoded but break a rule (zero divisor,
//!   missing or out-of-range `limit`).

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Unified error type for the HTTP handlers.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The query string did not decode into the expected parameter types.
    #[error("Invalid parameter format")]
    InvalidParameters(#[source] QueryRejection),

    /// A decoded parameter is outside its allowed range.
    #[error("validation failed: {reason}")]
    Validation { reason: String },
}

impl ApiError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Status label attached to request metrics.
    pub const fn status_label(&self) -> &'static str {
        match self {
            Self::InvalidParameters(_) => "error_parse",
            Self::Validation { .. } => "error_validation",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidParameters(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
