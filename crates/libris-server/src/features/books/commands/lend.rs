//! Lend a book to the calling user
//!
//! The book must be available and the borrower must be under the loan limit
//! of their tier. The loan insert and the status change commit together;
//! the book and the borrower's profile stay locked until then, so two lends
//! can neither take the same copy nor both squeeze under the limit.

use chrono::{NaiveDate, Utc};
use libris_common::types::BookStatus;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditContext, AuditRecorder};
use crate::features::books::BookError;
use crate::middleware::AuthUser;
use crate::models::loan::{loan_returning, Loan};
use crate::models::profile::{profile_select, Profile};
use crate::models::Book;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendBookCommand {
    #[serde(skip)]
    pub book_id: Uuid,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl crate::cqrs::middleware::Command for LendBookCommand {}

impl LendBookCommand {
    pub fn validate(&self, today: NaiveDate) -> Result<(), BookError> {
        if self.due_date < today {
            return Err(BookError::InvalidField(
                "Due date cannot be in the past".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fails when `outstanding` loans already fill the profile's limit
pub fn check_loan_limit(profile: &Profile, outstanding: i64) -> Result<(), BookError> {
    if outstanding >= i64::from(profile.loan_limit) {
        return Err(BookError::LoanLimitReached(profile.loan_limit));
    }
    Ok(())
}

#[tracing::instrument(
    skip(pool, recorder, ctx, borrower, command),
    fields(book_id = %command.book_id, borrower = %borrower.username)
)]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    borrower: &AuthUser,
    command: LendBookCommand,
) -> Result<Loan, BookError> {
    command.validate(Utc::now().date_naive())?;

    let mut tx = pool.begin().await?;

    let book = Book::find_for_update(&mut *tx, command.book_id)
        .await?
        .ok_or(BookError::NotFound(command.book_id))?;

    if book.status != BookStatus::Available.as_str() {
        return Err(BookError::NotAvailable(book.status));
    }

    let profile = sqlx::query_as::<_, Profile>(&format!(
        "{} WHERE p.user_id = $1 FOR UPDATE OF p",
        profile_select()
    ))
    .bind(borrower.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(BookError::NoProfile)?;

    let outstanding = Loan::count_outstanding(&mut *tx, borrower.id).await?;
    check_loan_limit(&profile, outstanding)?;

    let loan = sqlx::query_as::<_, Loan>(&loan_returning(
        r#"
        INSERT INTO loans (book_id, user_id, due_date, notes)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    ))
    .bind(book.id)
    .bind(borrower.id)
    .bind(command.due_date)
    .bind(&command.notes)
    .fetch_one(&mut *tx)
    .await?;

    let lent = Book::set_status(&mut *tx, book.id, BookStatus::OnLoan.as_str()).await?;

    tx.commit().await?;

    tracing::info!(
        loan_id = %loan.id,
        outstanding = outstanding + 1,
        loan_limit = profile.loan_limit,
        "Book lent"
    );

    recorder
        .event(
            ctx,
            AuditAction::Loan,
            &loan,
            json!({
                "book": book.title,
                "due_date": loan.due_date.to_string(),
            }),
        )
        .await;
    recorder.updated(ctx, &book, &lent).await;

    Ok(loan)
}
