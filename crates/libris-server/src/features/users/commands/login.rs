//! Exchange credentials for the user's API token
//!
//! A user holds at most one token; logging in again returns the same one.

use serde::Deserialize;
use sqlx::PgPool;

use super::{generate_token, SessionResponse};
use crate::features::users::{password, UserError};
use crate::models::{Profile, User};

#[derive(Clone, Deserialize)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl crate::cqrs::middleware::Command for LoginCommand {}

#[tracing::instrument(skip(pool, command), fields(username = %command.username))]
pub async fn handle(pool: &PgPool, command: LoginCommand) -> Result<SessionResponse, UserError> {
    let user = User::find_by_username(pool, &command.username)
        .await?
        .filter(|u| u.is_active)
        .ok_or(UserError::InvalidCredentials)?;

    if !password::verify_blocking(command.password, user.password_hash.clone()).await? {
        tracing::warn!("Failed login attempt");
        return Err(UserError::InvalidCredentials);
    }

    let token = sqlx::query_scalar::<_, String>(
        r#"
        INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING key
        "#,
    )
    .bind(generate_token())
    .bind(user.id)
    .fetch_one(pool)
    .await?;

    let profile = Profile::find_by_user(pool, user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(SessionResponse {
        token,
        user,
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditContext;
    use crate::features::shared::test_helpers::test_state;
    use crate::features::users::commands::register;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_login_reuses_token(pool: PgPool) -> anyhow::Result<()> {
        let state = test_state(pool.clone());
        let registered = register::handle(
            &state.db,
            &state.recorder,
            &AuditContext::system(),
            register::tests::command("luis"),
        )
        .await?;

        let login = |password: &str| LoginCommand {
            username: "luis".to_string(),
            password: password.to_string(),
        };

        let session = handle(&pool, login("lectura-diaria")).await?;
        assert_eq!(session.token, registered.token);
        assert!(session.profile.is_some());

        let wrong = handle(&pool, login("otra-clave")).await;
        assert!(matches!(wrong, Err(UserError::InvalidCredentials)));
        Ok(())
    }
}
