//! Create book command

use libris_common::types::BookStatus;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditRecorder};
use crate::features::books::error::map_write_error;
use crate::features::books::BookError;
use crate::features::shared::validation::{
    validate_isbn, validate_name, validate_optional, validate_publication_year,
};
use crate::models::book::{book_returning, Book, DEFAULT_LANGUAGE};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_PUBLISHER_LENGTH: usize = 100;
pub const MAX_LANGUAGE_LENGTH: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookCommand {
    pub title: String,
    pub author_id: Uuid,
    #[serde(default)]
    pub genre_id: Option<Uuid>,
    pub isbn: String,
    pub publication_year: i32,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl crate::cqrs::middleware::Command for CreateBookCommand {}

impl CreateBookCommand {
    /// Checks the fields and resolves the initial status
    pub fn validate(&self) -> Result<BookStatus, BookError> {
        validate_name(&self.title, "title", MAX_TITLE_LENGTH)?;
        validate_isbn(&self.isbn)?;
        validate_publication_year(self.publication_year).map_err(BookError::InvalidField)?;
        validate_page_count(self.page_count)?;
        validate_optional(self.publisher.as_deref(), "publisher", MAX_PUBLISHER_LENGTH)?;
        if let Some(ref language) = self.language {
            validate_name(language, "language", MAX_LANGUAGE_LENGTH)?;
        }

        match self.status {
            Some(ref status) => Ok(status.parse()?),
            None => Ok(BookStatus::default()),
        }
    }
}

pub(crate) fn validate_page_count(page_count: Option<i32>) -> Result<(), BookError> {
    match page_count {
        Some(count) if count <= 0 => Err(BookError::InvalidField(
            "Page count must be a positive number".to_string(),
        )),
        _ => Ok(()),
    }
}

#[tracing::instrument(
    skip(pool, recorder, ctx, command),
    fields(title = %command.title, isbn = %command.isbn)
)]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: CreateBookCommand,
) -> Result<Book, BookError> {
    let status = command.validate()?;

    let book = sqlx::query_as::<_, Book>(&book_returning(
        r#"
        INSERT INTO books (
            title, author_id, genre_id, isbn, publication_year,
            publisher, page_count, language, description, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    ))
    .bind(command.title.trim())
    .bind(command.author_id)
    .bind(command.genre_id)
    .bind(&command.isbn)
    .bind(command.publication_year)
    .bind(&command.publisher)
    .bind(command.page_count)
    .bind(command.language.as_deref().unwrap_or(DEFAULT_LANGUAGE))
    .bind(&command.description)
    .bind(status.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| map_write_error(e, &command.isbn, command.author_id, command.genre_id))?;

    tracing::info!(book_id = %book.id, "Book created");

    recorder.created(ctx, &book).await;
    Ok(book)
}
