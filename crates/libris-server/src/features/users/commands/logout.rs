use sqlx::PgPool;
use uuid::Uuid;

use crate::features::users::UserError;

/// Revoke the caller's API token
#[derive(Debug, Clone)]
pub struct LogoutCommand {
    pub user_id: Uuid,
}

impl crate::cqrs::middleware::Command for LogoutCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &PgPool, command: LogoutCommand) -> Result<(), UserError> {
    let removed = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
        .bind(command.user_id)
        .execute(pool)
        .await?
        .rows_affected();

    tracing::info!(user_id = %command.user_id, removed, "User logged out");
    Ok(())
}
