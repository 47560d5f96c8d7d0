//! Delete genre command
//!
//! Books in the genre are kept with no genre.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditRecorder};
use crate::features::genres::GenreError;
use crate::models::Genre;

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteGenreCommand {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Command for DeleteGenreCommand {}

#[tracing::instrument(skip(pool, recorder, ctx), fields(genre_id = %command.id))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: DeleteGenreCommand,
) -> Result<Genre, GenreError> {
    let genre = sqlx::query_as::<_, Genre>(
        "DELETE FROM genres WHERE id = $1 RETURNING id, name, description",
    )
    .bind(command.id)
    .fetch_optional(pool)
    .await?
    .ok_or(GenreError::NotFound(command.id))?;

    tracing::info!(genre_id = %genre.id, "Genre deleted");

    recorder.deleted(ctx, &genre).await;
    Ok(genre)
}
