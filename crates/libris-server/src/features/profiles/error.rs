use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use libris_common::LibrisError;
use uuid::Uuid;

use crate::features::shared::{error_response, internal_error, NameValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{0}")]
    Validation(#[from] NameValidationError),

    #[error("{0}")]
    InvalidTier(#[from] LibrisError),

    #[error("{0}")]
    Pagination(&'static str),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Only library staff can change membership tiers")]
    TierChangeForbidden,

    #[error("Profile '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        match self {
            ProfileError::Validation(_)
            | ProfileError::InvalidTier(_)
            | ProfileError::Pagination(_)
            | ProfileError::NoFieldsToUpdate => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            },
            ProfileError::TierChangeForbidden => {
                error_response(StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string())
            },
            ProfileError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            },
            ProfileError::Database(ref e) => internal_error("profile", e),
        }
    }
}
