//! Update author command
//!
//! Only the fields present in the request are changed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::create::{MAX_AUTHOR_NAME_LENGTH, MAX_NATIONALITY_LENGTH};
use crate::audit::{AuditContext, AuditRecorder};
use crate::features::authors::AuthorError;
use crate::features::shared::validation::{validate_name, validate_optional};
use crate::models::author::{Author, AUTHOR_COLUMNS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAuthorCommand {
    #[serde(skip)]
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub biography: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<String>,
}

impl crate::cqrs::middleware::Command for UpdateAuthorCommand {}

impl UpdateAuthorCommand {
    pub fn validate(&self) -> Result<(), AuthorError> {
        if self.first_name.is_none()
            && self.last_name.is_none()
            && self.biography.is_none()
            && self.birth_date.is_none()
            && self.nationality.is_none()
        {
            return Err(AuthorError::NoFieldsToUpdate);
        }
        if let Some(ref first_name) = self.first_name {
            validate_name(first_name, "first_name", MAX_AUTHOR_NAME_LENGTH)?;
        }
        if let Some(ref last_name) = self.last_name {
            validate_name(last_name, "last_name", MAX_AUTHOR_NAME_LENGTH)?;
        }
        validate_optional(self.nationality.as_deref(), "nationality", MAX_NATIONALITY_LENGTH)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool, recorder, ctx, command), fields(author_id = %command.id))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: UpdateAuthorCommand,
) -> Result<Author, AuthorError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let before = sqlx::query_as::<_, Author>(&format!(
        "SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = $1 FOR UPDATE"
    ))
    .bind(command.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AuthorError::NotFound(command.id))?;

    let after = sqlx::query_as::<_, Author>(&format!(
        r#"
        UPDATE authors SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            biography = COALESCE($4, biography),
            birth_date = COALESCE($5, birth_date),
            nationality = COALESCE($6, nationality)
        WHERE id = $1
        RETURNING {AUTHOR_COLUMNS}
        "#
    ))
    .bind(command.id)
    .bind(command.first_name.as_deref().map(str::trim))
    .bind(command.last_name.as_deref().map(str::trim))
    .bind(&command.biography)
    .bind(command.birth_date)
    .bind(&command.nationality)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    recorder.updated(ctx, &before, &after).await;
    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_is_rejected() {
        let command = UpdateAuthorCommand {
            id: Uuid::new_v4(),
            ..Default::default()
        };
        assert!(matches!(command.validate(), Err(AuthorError::NoFieldsToUpdate)));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let command = UpdateAuthorCommand {
            id: Uuid::new_v4(),
            last_name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(matches!(command.validate(), Err(AuthorError::Validation(_))));
    }
}
