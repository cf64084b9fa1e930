//! HTTP error handling
//!
//! Every failing handler answers with the same JSON shape:
//! `{ "message": ..., "code": ... }`, with the status derived from the code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use taskboard_core::ControllerError;

/// Machine-readable error codes
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
pub const DATABASE_ERROR: &str = "DATABASE_ERROR";

/// HTTP error response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, VALIDATION_ERROR)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, UNAUTHORIZED)
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            UNAUTHORIZED => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ControllerError> for HttpError {
    fn from(err: ControllerError) -> Self {
        if err.is_client_error() {
            return HttpError::validation(err.to_string());
        }

        match err {
            ControllerError::Token(e) => HttpError::unauthorized(format!("Invalid token: {}", e)),
            other => {
                tracing::error!(error = %other, "controller operation failed");
                HttpError::with_details("Internal server error", DATABASE_ERROR, other.to_string())
            }
        }
    }
}
