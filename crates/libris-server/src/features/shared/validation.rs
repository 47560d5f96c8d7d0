//! Input validation shared by commands
//!
//! ```rust,ignore
//! use libris_server::features::shared::validation::{validate_isbn, validate_name};
//!
//! validate_name(&command.title, 200)?;
//! validate_isbn(&command.isbn)?;
//! ```

use chrono::{Datelike, Utc};
use thiserror::Error;

use crate::models::book::MAX_ISBN_LENGTH;

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_length} characters")]
    TooLong { field: &'static str, max_length: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IsbnValidationError {
    #[error("ISBN is required")]
    Required,

    #[error("ISBN must be at most 13 characters")]
    TooLong,

    #[error("ISBN may only contain digits and a trailing X")]
    InvalidFormat,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    #[error("Username is required")]
    UsernameRequired,

    #[error("Username must be at most 150 characters")]
    UsernameTooLong,

    #[error("Username may only contain letters, digits and @.+-_")]
    UsernameFormat,

    #[error("Email address is invalid")]
    InvalidEmail,

    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
}

/// Validate a required text field
///
/// Blank (whitespace only) values count as empty. Length is measured in
/// characters, not bytes.
pub fn validate_name(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<(), NameValidationError> {
    if value.trim().is_empty() {
        return Err(NameValidationError::Required { field });
    }
    if value.chars().count() > max_length {
        return Err(NameValidationError::TooLong { field, max_length });
    }
    Ok(())
}

/// Validate an optional text field: only the length is checked
pub fn validate_optional(
    value: Option<&str>,
    field: &'static str,
    max_length: usize,
) -> Result<(), NameValidationError> {
    match value {
        Some(v) if v.chars().count() > max_length => {
            Err(NameValidationError::TooLong { field, max_length })
        },
        _ => Ok(()),
    }
}

/// ISBN-10 or ISBN-13 without separators
pub fn validate_isbn(isbn: &str) -> Result<(), IsbnValidationError> {
    if isbn.is_empty() {
        return Err(IsbnValidationError::Required);
    }
    if isbn.len() > MAX_ISBN_LENGTH {
        return Err(IsbnValidationError::TooLong);
    }

    let (body, last) = isbn.split_at(isbn.len() - 1);
    let body_ok = body.chars().all(|c| c.is_ascii_digit());
    let last_ok = last.chars().all(|c| c.is_ascii_digit() || c == 'X' || c == 'x');
    if !(body_ok && last_ok) {
        return Err(IsbnValidationError::InvalidFormat);
    }

    Ok(())
}

/// Years from 1 up to next year
pub fn validate_publication_year(year: i32) -> Result<(), String> {
    let max = Utc::now().year() + 1;
    if !(1..=max).contains(&year) {
        return Err(format!("Publication year must be between 1 and {}", max));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AccountValidationError> {
    if username.is_empty() {
        return Err(AccountValidationError::UsernameRequired);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AccountValidationError::UsernameTooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(AccountValidationError::UsernameFormat);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AccountValidationError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        },
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AccountValidationError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> Result<(), AccountValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountValidationError::PasswordTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Rayuela", "title", 200).is_ok());
        assert_eq!(
            validate_name("   ", "title", 200),
            Err(NameValidationError::Required { field: "title" })
        );
        assert_eq!(
            validate_name(&"ñ".repeat(101), "name", 100),
            Err(NameValidationError::TooLong { field: "name", max_length: 100 })
        );
        // 100 multi-byte characters still fit
        assert!(validate_name(&"ñ".repeat(100), "name", 100).is_ok());
    }

    #[test]
    fn test_validate_optional() {
        assert!(validate_optional(None, "publisher", 10).is_ok());
        assert!(validate_optional(Some(""), "publisher", 10).is_ok());
        assert!(validate_optional(Some("Alfaguara Ediciones"), "publisher", 10).is_err());
    }

    #[test]
    fn test_validate_isbn() {
        assert!(validate_isbn("9780307350454").is_ok());
        assert!(validate_isbn("030735045X").is_ok());
        assert_eq!(validate_isbn(""), Err(IsbnValidationError::Required));
        assert_eq!(validate_isbn("97803073504541"), Err(IsbnValidationError::TooLong));
        assert_eq!(validate_isbn("978-0307350"), Err(IsbnValidationError::InvalidFormat));
        assert_eq!(validate_isbn("X307350454"), Err(IsbnValidationError::InvalidFormat));
    }

    #[test]
    fn test_validate_publication_year() {
        assert!(validate_publication_year(1605).is_ok());
        assert!(validate_publication_year(0).is_err());
        assert!(validate_publication_year(Utc::now().year() + 5).is_err());
    }

    #[test]
    fn test_validate_account_fields() {
        assert!(validate_username("maria.lopez+1").is_ok());
        assert_eq!(validate_username(""), Err(AccountValidationError::UsernameRequired));
        assert_eq!(
            validate_username("maria lopez"),
            Err(AccountValidationError::UsernameFormat)
        );
        assert_eq!(
            validate_username(&"a".repeat(151)),
            Err(AccountValidationError::UsernameTooLong)
        );

        assert!(validate_email("maria@biblioteca.es").is_ok());
        for bad in ["maria", "@biblioteca.es", "maria@local", "maria@.es", "ma ria@b.es"] {
            assert!(validate_email(bad).is_err(), "{} should be rejected", bad);
        }

        assert!(validate_password("correcthorse").is_ok());
        assert_eq!(validate_password("short"), Err(AccountValidationError::PasswordTooShort));
    }
}
