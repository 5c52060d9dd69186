//! Error types for the equipment checkout client

use serde::Deserialize;
use thiserror::Error;

/// Classification of backend failures, matching the status codes the
/// equipment API answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// 403: the user already has a request, staged request or checkout for the model
    Duplicate,
    /// 404: checkout or equipment not found
    NotFound,
    /// 422: rejected payload or failed operation
    Unprocessable,
    /// 451: liability waiver not signed
    WaiverNotSigned,
    Other,
}

impl BackendErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => Self::Duplicate,
            404 => Self::NotFound,
            422 => Self::Unprocessable,
            451 => Self::WaiverNotSigned,
            _ => Self::Other,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Backend classification, `None` when the error did not come from a backend response
    pub fn backend_kind(&self) -> Option<BackendErrorKind> {
        match self {
            AppError::Api { status, .. } => Some(BackendErrorKind::from_status(*status)),
            _ => None,
        }
    }

    /// Message suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error body sent by the backend. `detail` is a string for business errors
/// and a list of field errors for rejected payloads.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub detail: serde_json::Value,
}

impl ErrorResponse {
    pub fn into_detail(self) -> String {
        match self.detail {
            serde_json::Value::String(detail) => detail,
            other => other.to_string(),
        }
    }
}

/// Result type alias for client operations
pub type AppResult<T> = Result<T, AppError>;
