use sqlx::PgPool;
use uuid::Uuid;

use crate::features::loans::LoanError;
use crate::models::loan::{loan_select, Loan};

#[derive(Debug, Clone)]
pub struct GetLoanQuery {
    pub id: Uuid,
    /// Restrict to this borrower; `None` sees every loan
    pub borrower: Option<Uuid>,
}

impl crate::cqrs::middleware::Query for GetLoanQuery {}

/// Loans outside the caller's view are reported as missing
pub async fn handle(pool: &PgPool, query: GetLoanQuery) -> Result<Loan, LoanError> {
    sqlx::query_as::<_, Loan>(&format!(
        "{} WHERE l.id = $1 AND ($2::uuid IS NULL OR l.user_id = $2)",
        loan_select()
    ))
    .bind(query.id)
    .bind(query.borrower)
    .fetch_optional(pool)
    .await?
    .ok_or(LoanError::NotFound(query.id))
}
