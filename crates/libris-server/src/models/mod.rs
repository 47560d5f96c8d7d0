//! Database models
//!
//! Row types for the tracked entities. Each implements [`Auditable`] so the
//! write paths can hand it to the audit recorder, and each carries the
//! lookups shared by more than one feature slice.
//!
//! [`Auditable`]: crate::audit::Auditable

pub mod author;
pub mod book;
pub mod genre;
pub mod loan;
pub mod profile;
pub mod user;

pub use author::Author;
pub use book::Book;
pub use genre::Genre;
pub use loan::Loan;
pub use profile::Profile;
pub use user::User;
