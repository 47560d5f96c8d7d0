use sqlx::PgPool;
use uuid::Uuid;

use crate::features::genres::GenreError;
use crate::models::Genre;

#[derive(Debug, Clone)]
pub struct GetGenreQuery {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Query for GetGenreQuery {}

pub async fn handle(pool: &PgPool, query: GetGenreQuery) -> Result<Genre, GenreError> {
    Genre::find(pool, query.id)
        .await?
        .ok_or(GenreError::NotFound(query.id))
}
