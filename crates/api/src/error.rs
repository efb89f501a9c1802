//! Error types and the wire error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use ingest::IngestError;
use thiserror::Error;

/// Errors that can occur while handling an API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed validation before reaching the core.
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
    },

    /// Ingestion workflow failure.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Database failure outside ingestion.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ApiError {
    /// Shorthand for a validation failure.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            code,
            message: message.into(),
        }
    }

    /// Status, code, summary, and detail for the wire envelope.
    fn parts(&self) -> (StatusCode, &'static str, &'static str, String) {
        match self {
            ApiError::Validation { code, message } => {
                (StatusCode::BAD_REQUEST, *code, "Invalid request", message.clone())
            }
            ApiError::Ingest(err) => {
                let status = match err {
                    IngestError::UserNotFound { .. } => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let summary = match err {
                    IngestError::UserNotFound { .. } => "User not found",
                    IngestError::UploadFailed { .. } => "Upload failed, message rolled back",
                    IngestError::Rpc(_) => "Failed to create message",
                    _ => "Failed to ingest message",
                };
                (status, err.code(), summary, err.to_string())
            }
            ApiError::Database(err) => {
                let status = match err {
                    DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let code = match err {
                    DatabaseError::NotFound { .. } => "NOT_FOUND",
                    _ => "SERVER_ERROR",
                };
                (status, code, "Internal server error", err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, summary, detail) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %detail, "request failed");
        } else {
            tracing::debug!(code, error = %detail, "request rejected");
        }

        let body = serde_json::json!({
            "success": false,
            "message": summary,
            "error": {
                "code": code,
                "message": detail,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
