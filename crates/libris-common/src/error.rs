//! Error types shared by Libris crates

use thiserror::Error;

/// Result type alias for shared Libris operations
pub type Result<T> = std::result::Result<T, LibrisError>;

/// Errors raised by shared domain types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibrisError {
    #[error("Unknown user tier: {0}")]
    UnknownTier(String),

    #[error("Unknown book status: {0}")]
    UnknownBookStatus(String),

    #[error("Unknown loan status: {0}")]
    UnknownLoanStatus(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
