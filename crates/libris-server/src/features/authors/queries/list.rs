//! List authors, optionally filtered by a name fragment

use serde::Deserialize;
use sqlx::PgPool;

use crate::features::authors::AuthorError;
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::author::{Author, AUTHOR_COLUMNS};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAuthorsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive match on first or last name
    pub search: Option<String>,
}

impl crate::cqrs::middleware::Query for ListAuthorsQuery {}

impl ListAuthorsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
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
    query: ListAuthorsQuery,
) -> Result<(Vec<Author>, PaginationMetadata), AuthorError> {
    let pagination = query.pagination();
    pagination.validate().map_err(AuthorError::Pagination)?;
    let pattern = query.pattern();

    let filter = "($1::text IS NULL OR first_name ILIKE $1 OR last_name ILIKE $1)";

    let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM authors WHERE {filter}"))
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let authors = sqlx::query_as::<_, Author>(&format!(
        r#"
        SELECT {AUTHOR_COLUMNS} FROM authors
        WHERE {filter}
        ORDER BY last_name, first_name
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(&pattern)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok((authors, PaginationMetadata::from_params(&pagination, total)))
}
