//! Delete author command
//!
//! Books by the author are removed with it, and so are their loans. Each
//! removed row gets its own delete entry.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditRecorder};
use crate::features::authors::AuthorError;
use crate::models::author::{Author, AUTHOR_COLUMNS};
use crate::models::{Book, Loan};

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAuthorCommand {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Command for DeleteAuthorCommand {}

#[tracing::instrument(skip(pool, recorder, ctx), fields(author_id = %command.id))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: DeleteAuthorCommand,
) -> Result<Author, AuthorError> {
    let mut tx = pool.begin().await?;

    let author = sqlx::query_as::<_, Author>(&format!(
        "SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = $1 FOR UPDATE"
    ))
    .bind(command.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AuthorError::NotFound(command.id))?;

    let book_ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM books WHERE author_id = $1 FOR UPDATE")
            .bind(author.id)
            .fetch_all(&mut *tx)
            .await?;
    let loans = Loan::delete_for_books(&mut *tx, &book_ids).await?;
    let books = Book::delete_by_author(&mut *tx, author.id).await?;

    sqlx::query("DELETE FROM authors WHERE id = $1")
        .bind(author.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        author_id = %author.id,
        books = books.len(),
        loans = loans.len(),
        "Author deleted"
    );

    for loan in &loans {
        recorder.deleted(ctx, loan).await;
    }
    for book in &books {
        recorder.deleted(ctx, book).await;
    }
    recorder.deleted(ctx, &author).await;
    Ok(author)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{
        audit_actions, test_state, TestAuthor, TestBook, TestUser,
    };
    use libris_common::types::UserTier;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_removed_books_and_loans_are_audited(pool: PgPool) -> anyhow::Result<()> {
        let state = test_state(pool.clone());
        let librarian = TestUser::new("librarian")
            .with_tier(UserTier::Librarian)
            .insert(&pool)
            .await?;
        let reader = TestUser::new("reader").insert(&pool).await?;
        let author = TestAuthor::new("Ernesto", "Sabato").insert(&pool).await?;
        let book = TestBook::new(&author, "El túnel")
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

        let deleted = handle(
            &state.db,
            &state.recorder,
            &librarian.context(),
            DeleteAuthorCommand { id: author.id },
        )
        .await?;
        assert_eq!(deleted.id, author.id);

        let books_left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author.id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(books_left, 0);

        assert_eq!(audit_actions(&pool, author.id).await?, vec!["delete"]);
        assert_eq!(audit_actions(&pool, book.id).await?, vec!["delete"]);
        assert_eq!(audit_actions(&pool, loan_id).await?, vec!["delete"]);

        let (object_type, object_repr, user_id): (String, String, Option<Uuid>) = sqlx::query_as(
            "SELECT object_type, object_repr, user_id FROM audit_log WHERE object_id = $1",
        )
        .bind(book.id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(object_type, "Book");
        assert_eq!(object_repr, "El túnel - Ernesto Sabato");
        assert_eq!(user_id, Some(librarian.id));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_missing_author(pool: PgPool) -> anyhow::Result<()> {
        let state = test_state(pool.clone());
        let librarian = TestUser::new("librarian").insert(&pool).await?;

        let result = handle(
            &state.db,
            &state.recorder,
            &librarian.context(),
            DeleteAuthorCommand { id: Uuid::new_v4() },
        )
        .await;
        assert!(matches!(result, Err(AuthorError::NotFound(_))));
        Ok(())
    }
}
