use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use libris_common::LibrisError;
use uuid::Uuid;

use crate::features::shared::validation::IsbnValidationError;
use crate::features::shared::error_helpers::{constraint_name, map_constraint_violation};
use crate::features::shared::{error_response, internal_error, NameValidationError};

#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("{0}")]
    Validation(#[from] NameValidationError),

    #[error("{0}")]
    Isbn(#[from] IsbnValidationError),

    #[error("{0}")]
    InvalidField(String),

    #[error("{0}")]
    InvalidStatus(#[from] LibrisError),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Book '{0}' not found")]
    NotFound(Uuid),

    #[error("Author '{0}' does not exist")]
    AuthorNotFound(Uuid),

    #[error("Genre '{0}' does not exist")]
    GenreNotFound(Uuid),

    #[error("A book with ISBN '{0}' already exists")]
    DuplicateIsbn(String),

    #[error("Book is not available (status: {0})")]
    NotAvailable(String),

    #[error("Loan limit of {0} reached")]
    LoanLimitReached(i32),

    #[error("User has no library profile")]
    NoProfile,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for BookError {
    fn into_response(self) -> Response {
        match self {
            BookError::Validation(_)
            | BookError::Isbn(_)
            | BookError::InvalidField(_)
            | BookError::InvalidStatus(_)
            | BookError::NoFieldsToUpdate
            | BookError::AuthorNotFound(_)
            | BookError::GenreNotFound(_)
            | BookError::NotAvailable(_)
            | BookError::LoanLimitReached(_)
            | BookError::NoProfile => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            },
            BookError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            },
            BookError::DuplicateIsbn(_) => {
                error_response(StatusCode::CONFLICT, "CONFLICT", self.to_string())
            },
            BookError::Database(ref e) => internal_error("book", e),
        }
    }
}

/// Map a failed insert or update of a book row
///
/// The genre is the only nullable reference, so a foreign-key failure on it
/// is told apart by constraint name.
pub(crate) fn map_write_error(
    error: sqlx::Error,
    isbn: &str,
    author_id: Uuid,
    genre_id: Option<Uuid>,
) -> BookError {
    if constraint_name(&error) == Some("books_genre_id_fkey") {
        return BookError::GenreNotFound(genre_id.unwrap_or_default());
    }
    map_constraint_violation(
        error,
        BookError::DuplicateIsbn(isbn.to_string()),
        BookError::AuthorNotFound(author_id),
        BookError::Database,
    )
}
