//! Helpers shared by the feature slices
//!
//! - **pagination**: page/per-page parameters and response metadata
//! - **validation**: input checks for names, ISBNs, accounts
//! - **error_helpers**: constraint-violation mapping and error envelopes
//! - **test_helpers**: database fixtures (test-only)

pub mod error_helpers;
pub mod pagination;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use error_helpers::{error_response, internal_error, map_constraint_violation};
pub use pagination::{PaginationMetadata, PaginationParams};
pub use validation::{validate_name, validate_optional, NameValidationError};
