use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use libris_common::LibrisError;
use uuid::Uuid;

use crate::features::shared::{error_response, internal_error};

#[derive(Debug, thiserror::Error)]
pub enum LoanError {
    #[error("{0}")]
    InvalidField(String),

    #[error("{0}")]
    InvalidStatus(#[from] LibrisError),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Loan '{0}' not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Loan is not active (status: {0})")]
    NotOutstanding(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for LoanError {
    fn into_response(self) -> Response {
        match self {
            LoanError::InvalidField(_)
            | LoanError::InvalidStatus(_)
            | LoanError::NoFieldsToUpdate
            | LoanError::NotOutstanding(_) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            },
            LoanError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            },
            LoanError::Forbidden(_) => {
                error_response(StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string())
            },
            LoanError::Database(ref e) => internal_error("loan", e),
        }
    }
}
