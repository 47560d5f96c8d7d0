//! Domain enums shared across crates
//!
//! Each enum is stored as lowercase text in the database and on the wire.
//! `as_str` gives the stored form, `label` the human-readable one.

use crate::error::LibrisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Membership tier of a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    #[default]
    Free,
    Premium,
    Librarian,
    Dba,
}

impl UserTier {
    pub const ALL: [UserTier; 4] = [Self::Free, Self::Premium, Self::Librarian, Self::Dba];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Librarian => "librarian",
            Self::Dba => "dba",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free user",
            Self::Premium => "Premium user",
            Self::Librarian => "Librarian",
            Self::Dba => "Database administrator",
        }
    }

    /// Maximum number of outstanding loans
    pub fn loan_limit(self) -> i32 {
        match self {
            Self::Free => 3,
            Self::Premium => 10,
            Self::Librarian => 50,
            Self::Dba => 100,
        }
    }

    /// Librarians and DBAs may see and manage everyone's records
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Librarian | Self::Dba)
    }
}

impl fmt::Display for UserTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserTier {
    type Err = LibrisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            "librarian" => Ok(Self::Librarian),
            "dba" => Ok(Self::Dba),
            _ => Err(LibrisError::UnknownTier(s.to_string())),
        }
    }
}

/// Circulation status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    #[default]
    Available,
    OnLoan,
    Maintenance,
    Withdrawn,
}

impl BookStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnLoan => "on_loan",
            Self::Maintenance => "maintenance",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::OnLoan => "On loan",
            Self::Maintenance => "In maintenance",
            Self::Withdrawn => "Withdrawn",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = LibrisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "on_loan" => Ok(Self::OnLoan),
            "maintenance" => Ok(Self::Maintenance),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(LibrisError::UnknownBookStatus(s.to_string())),
        }
    }
}

/// Lifecycle status of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Active,
    Returned,
    Overdue,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Returned => "returned",
            Self::Overdue => "overdue",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Returned => "Returned",
            Self::Overdue => "Overdue",
        }
    }

    /// Active and overdue loans count against the borrower's limit
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Active | Self::Overdue)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = LibrisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "returned" => Ok(Self::Returned),
            "overdue" => Ok(Self::Overdue),
            _ => Err(LibrisError::UnknownLoanStatus(s.to_string())),
        }
    }
}
