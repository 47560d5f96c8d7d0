//! Libris Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling and logging bootstrap for the Libris
//! workspace members.
//!
//! - **Types**: user tiers, book and loan status enums with their string forms
//! - **Error Handling**: [`LibrisError`] and a result alias
//! - **Logging**: tracing subscriber setup driven by environment variables
//!
//! # Example
//!
//! ```
//! use libris_common::types::UserTier;
//!
//! let tier: UserTier = "premium".parse().unwrap();
//! assert_eq!(tier.loan_limit(), 10);
//! ```

pub mod error;
pub mod logging;
pub mod types;

pub use error::{LibrisError, Result};
