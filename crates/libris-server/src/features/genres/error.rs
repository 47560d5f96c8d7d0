use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::features::shared::{error_response, internal_error, NameValidationError};

#[derive(Debug, thiserror::Error)]
pub enum GenreError {
    #[error("{0}")]
    Validation(#[from] NameValidationError),

    #[error("{0}")]
    Pagination(&'static str),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Genre '{0}' not found")]
    NotFound(Uuid),

    #[error("Genre '{0}' already exists")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for GenreError {
    fn into_response(self) -> Response {
        match self {
            GenreError::Validation(_) | GenreError::Pagination(_) | GenreError::NoFieldsToUpdate => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            },
            GenreError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            },
            GenreError::DuplicateName(_) => {
                error_response(StatusCode::CONFLICT, "CONFLICT", self.to_string())
            },
            GenreError::Database(ref e) => internal_error("genre", e),
        }
    }
}
