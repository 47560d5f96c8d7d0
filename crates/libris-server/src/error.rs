//! Server-specific error types

use crate::api::response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias for server operations
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Application error types shared by handlers that are not tied to one slice
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Libris error: {0}")]
    Libris(#[from] libris_common::LibrisError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) | AppError::Libris(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) | AppError::Internal(_) | AppError::Libris(_) => {
                "INTERNAL_ERROR"
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!(error = %e, "Database error");
                "A database error occurred".to_string()
            },
            AppError::Internal(ref message) => {
                tracing::error!(%message, "Internal error");
                "An internal error occurred".to_string()
            },
            AppError::Libris(ref e) => {
                tracing::error!(error = %e, "Invalid stored value");
                "An internal error occurred".to_string()
            },
            ref other => other.to_string(),
        };

        ErrorResponse::new(self.code(), message).with_status(status)
    }
}

/// Errors raised below the HTTP layer (audit persistence, export)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Export error: {0}")]
    Export(#[from] crate::audit::ExportError),

    #[error("Libris error: {0}")]
    Libris(#[from] libris_common::LibrisError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ServerError> for AppError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Database(e) => AppError::Database(e),
            ServerError::Export(e) => AppError::Internal(e.to_string()),
            ServerError::Libris(e) => AppError::Libris(e),
            ServerError::NotFound(msg) => AppError::NotFound(msg),
        }
    }
}
