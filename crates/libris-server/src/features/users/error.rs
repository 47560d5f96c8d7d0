use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use libris_common::{types::UserTier, LibrisError};
use uuid::Uuid;

use crate::features::shared::validation::AccountValidationError;
use crate::features::shared::{error_response, internal_error, NameValidationError};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{0}")]
    Account(#[from] AccountValidationError),

    #[error("{0}")]
    Validation(#[from] NameValidationError),

    #[error("{0}")]
    InvalidTier(#[from] LibrisError),

    #[error("The {0} tier can only be assigned by library staff")]
    StaffTier(UserTier),

    #[error("{0}")]
    Pagination(&'static str),

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User '{0}' not found")]
    NotFound(Uuid),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            UserError::Account(_)
            | UserError::Validation(_)
            | UserError::InvalidTier(_)
            | UserError::StaffTier(_)
            | UserError::Pagination(_) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            },
            UserError::DuplicateUsername(_) => {
                error_response(StatusCode::CONFLICT, "CONFLICT", self.to_string())
            },
            UserError::InvalidCredentials => {
                error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            },
            UserError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            },
            UserError::Hashing(ref e) => internal_error("password_hash", e),
            UserError::Database(ref e) => internal_error("user", e),
        }
    }
}
