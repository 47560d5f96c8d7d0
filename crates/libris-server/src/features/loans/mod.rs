pub mod commands;
pub mod error;
pub mod queries;
pub mod routes;

pub use commands::{
    DeleteLoanCommand, MarkOverdueCommand, ReturnLoanCommand, UpdateLoanCommand,
};
pub use error::LoanError;
pub use queries::{GetLoanQuery, ListLoansQuery};
pub use routes::loans_routes;

use crate::middleware::AuthUser;
use uuid::Uuid;

/// Borrower filter for loan reads: `None` for staff, the caller otherwise
pub fn visible_to(user: &AuthUser) -> Option<Uuid> {
    if user.is_staff() {
        None
    } else {
        Some(user.id)
    }
}
