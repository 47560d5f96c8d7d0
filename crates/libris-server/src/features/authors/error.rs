use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::features::shared::{error_response, internal_error, NameValidationError};

#[derive(Debug, thiserror::Error)]
pub enum AuthorError {
    #[error("{0}")]
    Validation(#[from] NameValidationError),

    #[error("{0}")]
    Pagination(&'static str),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Author '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AuthorError {
    fn into_response(self) -> Response {
        match self {
            AuthorError::Validation(_)
            | AuthorError::Pagination(_)
            | AuthorError::NoFieldsToUpdate => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            },
            AuthorError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            },
            AuthorError::Database(ref e) => internal_error("author", e),
        }
    }
}
