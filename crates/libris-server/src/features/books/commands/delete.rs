use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditRecorder};
use crate::features::books::BookError;
use crate::models::{Book, Loan};

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteBookCommand {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Command for DeleteBookCommand {}

/// Delete a book and its loans, returning the deleted row
#[tracing::instrument(skip(pool, recorder, ctx), fields(book_id = %command.id))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: DeleteBookCommand,
) -> Result<Book, BookError> {
    let mut tx = pool.begin().await?;

    let book = Book::find_for_update(&mut *tx, command.id)
        .await?
        .ok_or(BookError::NotFound(command.id))?;

    let loans = Loan::delete_for_books(&mut *tx, &[book.id]).await?;

    sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(command.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(book_id = %book.id, loans = loans.len(), "Book deleted");

    for loan in &loans {
        recorder.deleted(ctx, loan).await;
    }
    recorder.deleted(ctx, &book).await;
    Ok(book)
}
