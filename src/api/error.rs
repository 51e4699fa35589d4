//! Unified API error handling for the portal.
//!
//! Failures are answered with the same envelope as successes:
//! `{"success": false, "message": "..."}` plus an HTTP status. No error codes
//! or internal details reach the client; the code is kept for logging only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::BackendError;
use crate::models::MessageReply;

/// Fixed message for requests that arrive without the required session
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Fallback message for unexpected failures
pub const INTERNAL: &str = "Internal server error";

/// Error codes, used to pick a default status and for log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    /// Backend rejected the request; status mirrors the backend
    Upstream,
    InternalError,
}

impl ErrorCode {
    /// Get the default HTTP status code for this error code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Upstream => StatusCode::BAD_REQUEST,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::Upstream => "upstream",
            ErrorCode::InternalError => "internal_error",
        }
    }
}

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status_code(),
            code,
            message: message.into(),
        }
    }

    /// Create an API error with a custom HTTP status code
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Replace the client-facing message, keeping code and status
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Missing session (401) with the fixed message
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized, UNAUTHORIZED)
    }

    /// Credentials or session rejected by the backend (401)
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Internal server error (500)
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Backend refused an action. Its message wins over `fallback`; its status
    /// hint is used when it is a 4xx/5xx code, else 400.
    pub fn upstream(message: Option<String>, status_hint: Option<u16>, fallback: &str) -> Self {
        let status = status_hint
            .and_then(|code| StatusCode::from_u16(code).ok())
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_REQUEST);

        Self::new(ErrorCode::Upstream, backend_message(message, fallback)).with_status(status)
    }
}

/// Backend message when present and non-empty, otherwise the fallback
pub fn backend_message(message: Option<String>, fallback: &str) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(MessageReply::failed(self.message))).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        tracing::error!(error = %err, "Backend call failed");
        ApiError::internal(INTERNAL)
    }
}

/// Unparseable inbound JSON is treated like any other unexpected failure.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!(error = %err, "Malformed request body");
        ApiError::internal(INTERNAL)
    }
}
