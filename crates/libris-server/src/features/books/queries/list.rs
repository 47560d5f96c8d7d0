//! List books with catalogue filters
//!
//! Filters combine with AND; results are newest first.

use libris_common::types::BookStatus;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::books::BookError;
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::book::{book_select, Book};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBooksQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub author_id: Option<Uuid>,
    pub genre_id: Option<Uuid>,
    /// Case-insensitive match on title or ISBN
    pub search: Option<String>,
}

impl crate::cqrs::middleware::Query for ListBooksQuery {}

const FILTER: &str = r#"
    ($1::text IS NULL OR b.status = $1)
    AND ($2::uuid IS NULL OR b.author_id = $2)
    AND ($3::uuid IS NULL OR b.genre_id = $3)
    AND ($4::text IS NULL OR b.title ILIKE $4 OR b.isbn ILIKE $4)
"#;

impl ListBooksQuery {
    fn status(&self) -> Result<Option<BookStatus>, BookError> {
        Ok(self.status.as_deref().map(str::parse::<BookStatus>).transpose()?)
    }

    fn pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    query: ListBooksQuery,
) -> Result<(Vec<Book>, PaginationMetadata), BookError> {
    let pagination = PaginationParams::new(query.page, query.per_page);
    pagination
        .validate()
        .map_err(|e| BookError::InvalidField(e.to_string()))?;
    let status = query.status()?.map(BookStatus::as_str);
    let pattern = query.pattern();

    let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM books b WHERE {FILTER}"))
        .bind(status)
        .bind(query.author_id)
        .bind(query.genre_id)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let books = sqlx::query_as::<_, Book>(&format!(
        "{} WHERE {FILTER} ORDER BY b.created_at DESC LIMIT $5 OFFSET $6",
        book_select()
    ))
    .bind(status)
    .bind(query.author_id)
    .bind(query.genre_id)
    .bind(&pattern)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok((books, PaginationMetadata::from_params(&pagination, total)))
}
