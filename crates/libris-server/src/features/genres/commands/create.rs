//! Create genre command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{AuditContext, AuditRecorder};
use crate::features::genres::GenreError;
use crate::features::shared::error_helpers::map_unique_violation;
use crate::features::shared::validate_name;
use crate::models::Genre;

pub const MAX_GENRE_NAME_LENGTH: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGenreCommand {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl crate::cqrs::middleware::Command for CreateGenreCommand {}

impl CreateGenreCommand {
    pub fn validate(&self) -> Result<(), GenreError> {
        validate_name(&self.name, "name", MAX_GENRE_NAME_LENGTH)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool, recorder, ctx, command), fields(name = %command.name))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: CreateGenreCommand,
) -> Result<Genre, GenreError> {
    command.validate()?;
    let name = command.name.trim().to_string();

    let genre = sqlx::query_as::<_, Genre>(
        "INSERT INTO genres (name, description) VALUES ($1, $2) RETURNING id, name, description",
    )
    .bind(&name)
    .bind(&command.description)
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique_violation(e, GenreError::DuplicateName(name.clone()), GenreError::Database))?;

    tracing::info!(genre_id = %genre.id, "Genre created");

    recorder.created(ctx, &genre).await;
    Ok(genre)
}
