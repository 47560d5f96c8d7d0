use serde::Deserialize;
use sqlx::PgPool;

use crate::features::genres::GenreError;
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::Genre;

/// Genres ordered by name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListGenresQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl crate::cqrs::middleware::Query for ListGenresQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    query: ListGenresQuery,
) -> Result<(Vec<Genre>, PaginationMetadata), GenreError> {
    let pagination = PaginationParams::new(query.page, query.per_page);
    pagination.validate().map_err(GenreError::Pagination)?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM genres")
        .fetch_one(pool)
        .await?;

    let genres = sqlx::query_as::<_, Genre>(
        "SELECT id, name, description FROM genres ORDER BY name LIMIT $1 OFFSET $2",
    )
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok((genres, PaginationMetadata::from_params(&pagination, total)))
}
