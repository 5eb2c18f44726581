//! Application error types and HTTP response mapping.
//!
//! Defines `AppError`, one variant per ingestion outcome class, and implements
//! Axum's `IntoResponse` to convert errors to HTTP responses with JSON bodies.
//!
//! Error mappings:
//! - `Validation` → 400
//! - `NotFound` → 404
//! - `Conflict` → 409
//! - `Unexpected` → 500

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{subject} not found: {message}")]
    NotFound { subject: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(subject: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::NotFound {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Outcome class tag carried in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "BAD_REQUEST",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unexpected(_) => "UNEXPECTED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Unexpected(format!("Store error: {}", e))
    }
}

impl From<git2::Error> for AppError {
    fn from(e: git2::Error) -> Self {
        AppError::Unexpected(format!("Git error: {}", e))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Unexpected(format!("Ingestion task failed: {}", e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });

        match &self {
            AppError::Validation { field, .. } => body["field"] = json!(field),
            AppError::NotFound { subject, .. } => body["subject"] = json!(subject),
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::validation("name", "bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("language", "Rust").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Unexpected("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_names_field() {
        let err = AppError::validation("description", "too long");
        assert_eq!(err.to_string(), "Invalid description: too long");
        assert_eq!(err.kind(), "BAD_REQUEST");
    }
}
