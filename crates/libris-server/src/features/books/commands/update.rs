//! Update book command
//!
//! Only the fields present in the request are changed. `updated_at` is
//! refreshed on every save but never shows up in the audit diff.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::create::{
    validate_page_count, MAX_LANGUAGE_LENGTH, MAX_PUBLISHER_LENGTH, MAX_TITLE_LENGTH,
};
use crate::audit::{AuditContext, AuditRecorder};
use crate::features::books::error::map_write_error;
use crate::features::books::BookError;
use crate::features::shared::validation::{
    validate_isbn, validate_name, validate_optional, validate_publication_year,
};
use crate::models::book::{book_returning, Book};
use libris_common::types::BookStatus;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBookCommand {
    #[serde(skip)]
    pub id: Uuid,
    pub title: Option<String>,
    pub author_id: Option<Uuid>,
    pub genre_id: Option<Uuid>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl crate::cqrs::middleware::Command for UpdateBookCommand {}

impl UpdateBookCommand {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author_id.is_none()
            && self.genre_id.is_none()
            && self.isbn.is_none()
            && self.publication_year.is_none()
            && self.publisher.is_none()
            && self.page_count.is_none()
            && self.language.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }

    /// Checks the present fields and parses the new status, if any
    pub fn validate(&self) -> Result<Option<BookStatus>, BookError> {
        if self.is_empty() {
            return Err(BookError::NoFieldsToUpdate);
        }
        if let Some(ref title) = self.title {
            validate_name(title, "title", MAX_TITLE_LENGTH)?;
        }
        if let Some(ref isbn) = self.isbn {
            validate_isbn(isbn)?;
        }
        if let Some(year) = self.publication_year {
            validate_publication_year(year).map_err(BookError::InvalidField)?;
        }
        validate_page_count(self.page_count)?;
        validate_optional(self.publisher.as_deref(), "publisher", MAX_PUBLISHER_LENGTH)?;
        if let Some(ref language) = self.language {
            validate_name(language, "language", MAX_LANGUAGE_LENGTH)?;
        }

        Ok(self.status.as_deref().map(str::parse::<BookStatus>).transpose()?)
    }
}

#[tracing::instrument(skip(pool, recorder, ctx, command), fields(book_id = %command.id))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: UpdateBookCommand,
) -> Result<Book, BookError> {
    let status = command.validate()?;

    let mut tx = pool.begin().await?;

    let before = Book::find_for_update(&mut *tx, command.id)
        .await?
        .ok_or(BookError::NotFound(command.id))?;

    let after = sqlx::query_as::<_, Book>(&book_returning(
        r#"
        UPDATE books SET
            title = COALESCE($2, title),
            author_id = COALESCE($3, author_id),
            genre_id = COALESCE($4, genre_id),
            isbn = COALESCE($5, isbn),
            publication_year = COALESCE($6, publication_year),
            publisher = COALESCE($7, publisher),
            page_count = COALESCE($8, page_count),
            language = COALESCE($9, language),
            description = COALESCE($10, description),
            status = COALESCE($11, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    ))
    .bind(command.id)
    .bind(command.title.as_deref().map(str::trim))
    .bind(command.author_id)
    .bind(command.genre_id)
    .bind(&command.isbn)
    .bind(command.publication_year)
    .bind(&command.publisher)
    .bind(command.page_count)
    .bind(&command.language)
    .bind(&command.description)
    .bind(status.map(BookStatus::as_str))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        map_write_error(
            e,
            command.isbn.as_deref().unwrap_or(&before.isbn),
            command.author_id.unwrap_or(before.author_id),
            command.genre_id,
        )
    })?;

    tx.commit().await?;

    tracing::info!(book_id = %after.id, "Book updated");

    recorder.updated(ctx, &before, &after).await;
    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{test_state, TestAuthor, TestBook, TestUser};
    use serde_json::json;

    #[test]
    fn test_validation() {
        assert!(matches!(
            UpdateBookCommand::default().validate(),
            Err(BookError::NoFieldsToUpdate)
        ));

        let maintenance = UpdateBookCommand {
            status: Some("maintenance".to_string()),
            ..Default::default()
        };
        assert_eq!(maintenance.validate().ok(), Some(Some(BookStatus::Maintenance)));

        let bad_year = UpdateBookCommand {
            publication_year: Some(-4),
            ..Default::default()
        };
        assert!(matches!(bad_year.validate(), Err(BookError::InvalidField(_))));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_title_change_is_diffed(pool: PgPool) -> anyhow::Result<()> {
        let state = test_state(pool.clone());
        let user = TestUser::new("editor").insert(&pool).await?;
        let author = TestAuthor::new("Julio", "Cortázar").insert(&pool).await?;
        let book = TestBook::new(&author, "Rayuela").insert(&pool).await?;

        let command = UpdateBookCommand {
            id: book.id,
            title: Some("Final del juego".to_string()),
            ..Default::default()
        };
        let updated = handle(&state.db, &state.recorder, &user.context(), command).await?;
        assert_eq!(updated.title, "Final del juego");

        let changes: serde_json::Value = sqlx::query_scalar(
            "SELECT changes FROM audit_log WHERE object_id = $1 AND action = 'update'",
        )
        .bind(book.id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(
            changes,
            json!({"title": {"old": "Rayuela", "new": "Final del juego"}})
        );
        Ok(())
    }
}
