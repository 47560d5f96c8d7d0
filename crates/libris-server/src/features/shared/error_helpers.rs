//! Database error handling utilities
//!
//! ```rust,ignore
//! use libris_server::features::shared::error_helpers::map_constraint_violation;
//!
//! sqlx::query(...)
//!     .execute(&pool)
//!     .await
//!     .map_err(|e| map_constraint_violation(
//!         e,
//!         BookError::DuplicateIsbn(isbn.clone()),
//!         BookError::AuthorNotFound(author_id),
//!         BookError::Database,
//!     ))?;
//! ```

use axum::{http::StatusCode, response::Response};
use sqlx::Error as SqlxError;

use crate::api::response::ErrorResponse;

/// Kind of constraint a failed statement ran into
#[derive(Debug)]
pub enum ConstraintViolation {
    UniqueViolation,
    ForeignKeyViolation,
    Other(SqlxError),
}

pub fn check_constraint_violation(error: SqlxError) -> ConstraintViolation {
    if let SqlxError::Database(ref db_err) = error {
        if db_err.is_unique_violation() {
            return ConstraintViolation::UniqueViolation;
        }
        if db_err.is_foreign_key_violation() {
            return ConstraintViolation::ForeignKeyViolation;
        }
    }
    ConstraintViolation::Other(error)
}

pub fn is_unique_violation(error: &SqlxError) -> bool {
    matches!(error, SqlxError::Database(db_err) if db_err.is_unique_violation())
}

/// Name of the constraint a database error refers to
pub fn constraint_name(error: &SqlxError) -> Option<&str> {
    match error {
        SqlxError::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

/// Map a unique violation to `unique_error`, anything else through `default_wrapper`
pub fn map_unique_violation<E, F>(error: SqlxError, unique_error: E, default_wrapper: F) -> E
where
    F: FnOnce(SqlxError) -> E,
{
    if is_unique_violation(&error) {
        unique_error
    } else {
        default_wrapper(error)
    }
}

/// Map unique and foreign-key violations to slice errors
pub fn map_constraint_violation<E, F>(
    error: SqlxError,
    unique_error: E,
    fk_error: E,
    default_wrapper: F,
) -> E
where
    F: FnOnce(SqlxError) -> E,
{
    match check_constraint_violation(error) {
        ConstraintViolation::UniqueViolation => unique_error,
        ConstraintViolation::ForeignKeyViolation => fk_error,
        ConstraintViolation::Other(e) => default_wrapper(e),
    }
}

/// Error envelope with the given status
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    ErrorResponse::new(code, message).with_status(status)
}

/// Log `error` and answer 500 with a generic message
pub fn internal_error(operation: &str, error: &dyn std::fmt::Display) -> Response {
    tracing::error!(%error, operation, "Database error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "A database error occurred",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum ShelfError {
        Duplicate,
        MissingAuthor,
        Database(String),
    }

    #[test]
    fn test_other_errors_are_wrapped() {
        let mapped = map_constraint_violation(
            SqlxError::RowNotFound,
            ShelfError::Duplicate,
            ShelfError::MissingAuthor,
            |e| ShelfError::Database(e.to_string()),
        );
        assert!(matches!(mapped, ShelfError::Database(_)));

        let mapped = map_unique_violation(SqlxError::PoolTimedOut, ShelfError::Duplicate, |e| {
            ShelfError::Database(e.to_string())
        });
        assert!(matches!(mapped, ShelfError::Database(_)));
        assert!(!is_unique_violation(&SqlxError::RowNotFound));
        assert_eq!(constraint_name(&SqlxError::RowNotFound), None);
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(StatusCode::CONFLICT, "CONFLICT", "taken");
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = internal_error("create_book", &"connection reset");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
