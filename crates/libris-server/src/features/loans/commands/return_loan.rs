//! Return a borrowed book
//!
//! Only the borrower or staff may return a loan, and only while it is
//! active or overdue. The loan and its book are updated in one transaction.

use libris_common::types::{BookStatus, LoanStatus};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{diff, AuditAction, AuditContext, AuditRecorder};
use crate::features::loans::LoanError;
use crate::middleware::AuthUser;
use crate::models::loan::{loan_returning, Loan};
use crate::models::Book;

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnLoanCommand {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Command for ReturnLoanCommand {}

/// Who may return `loan`, and whether it can still be returned
pub fn check_returnable(loan: &Loan, actor: &AuthUser) -> Result<(), LoanError> {
    if !actor.can_access(loan.user_id) {
        return Err(LoanError::Forbidden(
            "Only the borrower or library staff can return this loan",
        ));
    }

    let outstanding = loan
        .status
        .parse::<LoanStatus>()
        .map(LoanStatus::is_outstanding)
        .unwrap_or(false);
    if !outstanding {
        return Err(LoanError::NotOutstanding(loan.status.clone()));
    }
    Ok(())
}

#[tracing::instrument(
    skip(pool, recorder, ctx, actor),
    fields(loan_id = %command.id, actor = %actor.username)
)]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    actor: &AuthUser,
    command: ReturnLoanCommand,
) -> Result<Loan, LoanError> {
    let mut tx = pool.begin().await?;

    let before = Loan::find_for_update(&mut *tx, command.id)
        .await?
        .ok_or(LoanError::NotFound(command.id))?;
    check_returnable(&before, actor)?;

    let book_before = Book::find_for_update(&mut *tx, before.book_id).await?;

    let after = sqlx::query_as::<_, Loan>(&loan_returning(
        r#"
        UPDATE loans SET status = $2, returned_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    ))
    .bind(before.id)
    .bind(LoanStatus::Returned.as_str())
    .fetch_one(&mut *tx)
    .await?;

    let book_after = match book_before {
        Some(ref book) => {
            Some(Book::set_status(&mut *tx, book.id, BookStatus::Available.as_str()).await?)
        },
        None => None,
    };

    tx.commit().await?;

    tracing::info!(loan_id = %after.id, book_id = %after.book_id, "Loan returned");

    recorder
        .event(ctx, AuditAction::Return, &after, JsonValue::Object(diff(&before, &after)))
        .await;
    if let (Some(before), Some(after)) = (book_before, book_after) {
        recorder.updated(ctx, &before, &after).await;
    }

    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{
        audit_actions, test_state, TestAuthor, TestBook, TestUser,
    };
    use chrono::{Duration, Utc};
    use libris_common::types::UserTier;

    fn loan(user_id: Uuid, status: &str) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            book_title: "Ficciones".to_string(),
            user_id,
            username: "reader".to_string(),
            borrowed_at: Utc::now(),
            due_date: Utc::now().date_naive() + Duration::days(7),
            returned_at: None,
            status: status.to_string(),
            notes: None,
        }
    }

    fn actor(tier: UserTier) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            username: "someone".to_string(),
            tier,
        }
    }

    #[test]
    fn test_only_borrower_or_staff() {
        let stranger = actor(UserTier::Premium);
        let borrower = actor(UserTier::Free);
        let librarian = actor(UserTier::Librarian);
        let active = loan(borrower.id, "active");

        assert!(matches!(
            check_returnable(&active, &stranger),
            Err(LoanError::Forbidden(_))
        ));
        assert!(check_returnable(&active, &borrower).is_ok());
        assert!(check_returnable(&active, &librarian).is_ok());
    }

    #[test]
    fn test_only_outstanding_loans() {
        let borrower = actor(UserTier::Free);
        assert!(check_returnable(&loan(borrower.id, "overdue"), &borrower).is_ok());
        assert!(matches!(
            check_returnable(&loan(borrower.id, "returned"), &borrower),
            Err(LoanError::NotOutstanding(_))
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_return_frees_book(pool: PgPool) -> anyhow::Result<()> {
        let state = test_state(pool.clone());
        let reader = TestUser::new("reader").insert(&pool).await?;
        let author = TestAuthor::new("Juan", "Rulfo").insert(&pool).await?;
        let book = TestBook::new(&author, "Pedro Páramo")
            .with_status("on_loan")
            .insert(&pool)
            .await?;

        let loan_id: Uuid = sqlx::query_scalar(
            "INSERT INTO loans (book_id, user_id, due_date) VALUES ($1, $2, CURRENT_DATE + 14) RETURNING id",
        )
        .bind(book.id)
        .bind(reader.id)
        .fetch_one(&pool)
        .await?;

        let returned = handle(
            &state.db,
            &state.recorder,
            &reader.context(),
            &reader.auth(),
            ReturnLoanCommand { id: loan_id },
        )
        .await?;

        assert_eq!(returned.status, "returned");
        assert!(returned.returned_at.is_some());
        assert_eq!(
            Book::find(&pool, book.id).await?.map(|b| b.status).as_deref(),
            Some("available")
        );
        assert_eq!(audit_actions(&pool, loan_id).await?, vec!["return"]);
        assert_eq!(audit_actions(&pool, book.id).await?, vec!["update"]);

        let changes: serde_json::Value = sqlx::query_scalar(
            "SELECT changes FROM audit_log WHERE object_id = $1",
        )
        .bind(loan_id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(changes["status"]["old"], "active");
        assert_eq!(changes["status"]["new"], "returned");
        Ok(())
    }
}
