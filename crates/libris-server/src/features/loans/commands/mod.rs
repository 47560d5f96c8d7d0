pub mod delete;
pub mod mark_overdue;
pub mod return_loan;
pub mod update;

pub use delete::DeleteLoanCommand;
pub use mark_overdue::MarkOverdueCommand;
pub use return_loan::ReturnLoanCommand;
pub use update::UpdateLoanCommand;

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::loan::{loan_select, Loan};

/// Lock a loan row the caller may see
pub(crate) async fn find_visible_for_update<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    borrower: Option<Uuid>,
) -> sqlx::Result<Option<Loan>> {
    sqlx::query_as::<_, Loan>(&format!(
        "{} WHERE l.id = $1 AND ($2::uuid IS NULL OR l.user_id = $2) FOR UPDATE OF l",
        loan_select()
    ))
    .bind(id)
    .bind(borrower)
    .fetch_optional(executor)
    .await
}
