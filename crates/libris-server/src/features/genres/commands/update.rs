use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::create::MAX_GENRE_NAME_LENGTH;
use crate::audit::{AuditContext, AuditRecorder};
use crate::features::genres::GenreError;
use crate::features::shared::error_helpers::map_unique_violation;
use crate::features::shared::validate_name;
use crate::models::Genre;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGenreCommand {
    #[serde(skip)]
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl crate::cqrs::middleware::Command for UpdateGenreCommand {}

impl UpdateGenreCommand {
    pub fn validate(&self) -> Result<(), GenreError> {
        if self.name.is_none() && self.description.is_none() {
            return Err(GenreError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name(name, "name", MAX_GENRE_NAME_LENGTH)?;
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, recorder, ctx, command), fields(genre_id = %command.id))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: UpdateGenreCommand,
) -> Result<Genre, GenreError> {
    command.validate()?;
    let name = command.name.as_deref().map(str::trim);

    let mut tx = pool.begin().await?;

    let before = sqlx::query_as::<_, Genre>(
        "SELECT id, name, description FROM genres WHERE id = $1 FOR UPDATE",
    )
    .bind(command.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(GenreError::NotFound(command.id))?;

    let after = sqlx::query_as::<_, Genre>(
        r#"
        UPDATE genres SET
            name = COALESCE($2, name),
            description = COALESCE($3, description)
        WHERE id = $1
        RETURNING id, name, description
        "#,
    )
    .bind(command.id)
    .bind(name)
    .bind(&command.description)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        map_unique_violation(
            e,
            GenreError::DuplicateName(name.unwrap_or_default().to_string()),
            GenreError::Database,
        )
    })?;

    tx.commit().await?;

    recorder.updated(ctx, &before, &after).await;
    Ok(after)
}
