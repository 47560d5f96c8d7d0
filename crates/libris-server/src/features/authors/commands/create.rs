//! Create author command

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{AuditContext, AuditRecorder};
use crate::features::authors::AuthorError;
use crate::features::shared::validation::{validate_name, validate_optional};
use crate::models::author::{Author, AUTHOR_COLUMNS};

pub const MAX_AUTHOR_NAME_LENGTH: usize = 100;
pub const MAX_NATIONALITY_LENGTH: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthorCommand {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub nationality: Option<String>,
}

impl crate::cqrs::middleware::Command for CreateAuthorCommand {}

impl CreateAuthorCommand {
    pub fn validate(&self) -> Result<(), AuthorError> {
        validate_name(&self.first_name, "first_name", MAX_AUTHOR_NAME_LENGTH)?;
        validate_name(&self.last_name, "last_name", MAX_AUTHOR_NAME_LENGTH)?;
        validate_optional(self.nationality.as_deref(), "nationality", MAX_NATIONALITY_LENGTH)?;
        Ok(())
    }
}

#[tracing::instrument(
    skip(pool, recorder, ctx, command),
    fields(first_name = %command.first_name, last_name = %command.last_name)
)]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: CreateAuthorCommand,
) -> Result<Author, AuthorError> {
    command.validate()?;

    let author = sqlx::query_as::<_, Author>(&format!(
        r#"
        INSERT INTO authors (first_name, last_name, biography, birth_date, nationality)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {AUTHOR_COLUMNS}
        "#
    ))
    .bind(command.first_name.trim())
    .bind(command.last_name.trim())
    .bind(&command.biography)
    .bind(command.birth_date)
    .bind(&command.nationality)
    .fetch_one(pool)
    .await?;

    tracing::info!(author_id = %author.id, "Author created");

    recorder.created(ctx, &author).await;
    Ok(author)
}
