//! Flip active loans past their due date to overdue

use chrono::NaiveDate;
use libris_common::types::LoanStatus;
use sqlx::PgPool;

use crate::audit::{AuditContext, AuditRecorder};
use crate::features::loans::LoanError;
use crate::middleware::AuthUser;
use crate::models::loan::{loan_returning, Loan};

#[derive(Debug, Clone)]
pub struct MarkOverdueCommand {
    /// Loans due strictly before this day become overdue
    pub today: NaiveDate,
}

impl crate::cqrs::middleware::Command for MarkOverdueCommand {}

#[tracing::instrument(skip(pool, recorder, ctx, actor), fields(actor = %actor.username))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    actor: &AuthUser,
    command: MarkOverdueCommand,
) -> Result<Vec<Loan>, LoanError> {
    if !actor.is_staff() {
        return Err(LoanError::Forbidden("Only library staff can mark overdue loans"));
    }

    let overdue = sqlx::query_as::<_, Loan>(&loan_returning(
        r#"
        UPDATE loans SET status = $1
        WHERE status = $2 AND due_date < $3
        RETURNING *
        "#,
    ))
    .bind(LoanStatus::Overdue.as_str())
    .bind(LoanStatus::Active.as_str())
    .bind(command.today)
    .fetch_all(pool)
    .await?;

    tracing::info!(count = overdue.len(), "Loans marked overdue");

    for loan in &overdue {
        let before = Loan {
            status: LoanStatus::Active.as_str().to_string(),
            ..loan.clone()
        };
        recorder.updated(ctx, &before, loan).await;
    }

    Ok(overdue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{
        audit_actions, test_state, TestAuthor, TestBook, TestUser,
    };
    use chrono::{Duration, Utc};
    use libris_common::types::UserTier;
    use uuid::Uuid;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_mark_overdue(pool: PgPool) -> anyhow::Result<()> {
        let state = test_state(pool.clone());
        let reader = TestUser::new("reader").insert(&pool).await?;
        let librarian = TestUser::new("librarian")
            .with_tier(UserTier::Librarian)
            .insert(&pool)
            .await?;
        let author = TestAuthor::new("Ernesto", "Sabato").insert(&pool).await?;
        let today = Utc::now().date_naive();

        let mut loans = Vec::new();
        for (title, due) in [("El túnel", today - Duration::days(2)), ("Sobre héroes", today)] {
            let book = TestBook::new(&author, title).with_status("on_loan").insert(&pool).await?;
            let id: Uuid = sqlx::query_scalar(
                "INSERT INTO loans (book_id, user_id, due_date) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(book.id)
            .bind(reader.id)
            .bind(due)
            .fetch_one(&pool)
            .await?;
            loans.push(id);
        }

        let denied = handle(
            &state.db,
            &state.recorder,
            &reader.context(),
            &reader.auth(),
            MarkOverdueCommand { today },
        )
        .await;
        assert!(matches!(denied, Err(LoanError::Forbidden(_))));

        let flipped = handle(
            &state.db,
            &state.recorder,
            &librarian.context(),
            &librarian.auth(),
            MarkOverdueCommand { today },
        )
        .await?;

        assert_eq!(flipped.len(), 1);
        assert_eq!(flipped[0].id, loans[0]);
        assert_eq!(audit_actions(&pool, loans[0]).await?, vec!["update"]);
        assert!(audit_actions(&pool, loans[1]).await?.is_empty());
        Ok(())
    }
}
