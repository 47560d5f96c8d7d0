//! Delete a loan
//!
//! Deleting a loan that still holds its book puts the book back on the
//! shelf.

use libris_common::types::{BookStatus, LoanStatus};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::find_visible_for_update;
use crate::audit::{AuditContext, AuditRecorder};
use crate::features::loans::LoanError;
use crate::models::{Book, Loan};

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteLoanCommand {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Command for DeleteLoanCommand {}

#[tracing::instrument(skip(pool, recorder, ctx), fields(loan_id = %command.id))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    borrower: Option<Uuid>,
    command: DeleteLoanCommand,
) -> Result<Loan, LoanError> {
    let mut tx = pool.begin().await?;

    let loan = find_visible_for_update(&mut *tx, command.id, borrower)
        .await?
        .ok_or(LoanError::NotFound(command.id))?;

    let holds_book = loan
        .status
        .parse::<LoanStatus>()
        .map(LoanStatus::is_outstanding)
        .unwrap_or(false);

    let released = if holds_book {
        let book = Book::find_for_update(&mut *tx, loan.book_id).await?;
        match book {
            Some(book) if book.status == BookStatus::OnLoan.as_str() => {
                let after =
                    Book::set_status(&mut *tx, book.id, BookStatus::Available.as_str()).await?;
                Some((book, after))
            },
            _ => None,
        }
    } else {
        None
    };

    sqlx::query("DELETE FROM loans WHERE id = $1")
        .bind(loan.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(loan_id = %loan.id, released_book = released.is_some(), "Loan deleted");

    recorder.deleted(ctx, &loan).await;
    if let Some((before, after)) = released {
        recorder.updated(ctx, &before, &after).await;
    }
    Ok(loan)
}
