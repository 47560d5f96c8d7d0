//! Register a new member
//!
//! Creates the account, its library profile and an API token in one
//! transaction. Self-registration is limited to the member tiers.

use chrono::NaiveDate;
use libris_common::types::UserTier;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{generate_token, SessionResponse};
use crate::audit::{AuditContext, AuditRecorder};
use crate::features::shared::error_helpers::map_unique_violation;
use crate::features::shared::validate_optional;
use crate::features::shared::validation::{validate_email, validate_password, validate_username};
use crate::features::users::{password, UserError};
use crate::models::profile::{profile_returning, Profile};
use crate::models::user::{User, USER_COLUMNS};

const MAX_PERSON_NAME_LENGTH: usize = 150;
const MAX_PHONE_LENGTH: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterProfile {
    pub tier: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterCommand {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub profile: Option<RegisterProfile>,
}

impl std::fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl crate::cqrs::middleware::Command for RegisterCommand {}

impl RegisterCommand {
    /// Checks the fields and resolves the requested tier
    pub fn validate(&self) -> Result<UserTier, UserError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_optional(Some(self.first_name.as_str()), "first_name", MAX_PERSON_NAME_LENGTH)?;
        validate_optional(Some(self.last_name.as_str()), "last_name", MAX_PERSON_NAME_LENGTH)?;

        let profile = self.profile.clone().unwrap_or_default();
        validate_optional(profile.phone.as_deref(), "phone", MAX_PHONE_LENGTH)?;

        let tier = match profile.tier {
            Some(ref tier) => tier.parse::<UserTier>()?,
            None => UserTier::default(),
        };
        if tier.is_staff() {
            return Err(UserError::StaffTier(tier));
        }
        Ok(tier)
    }
}

#[tracing::instrument(skip(pool, recorder, ctx, command), fields(username = %command.username))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    command: RegisterCommand,
) -> Result<SessionResponse, UserError> {
    let tier = command.validate()?;
    let password_hash = password::hash_blocking(command.password.clone()).await?;
    let details = command.profile.clone().unwrap_or_default();

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&command.username)
    .bind(&command.email)
    .bind(&command.first_name)
    .bind(&command.last_name)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        map_unique_violation(
            e,
            UserError::DuplicateUsername(command.username.clone()),
            UserError::Database,
        )
    })?;

    let profile = sqlx::query_as::<_, Profile>(&profile_returning(
        r#"
        INSERT INTO profiles (user_id, tier, phone, address, birth_date, loan_limit)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    ))
    .bind(user.id)
    .bind(tier.as_str())
    .bind(&details.phone)
    .bind(&details.address)
    .bind(details.birth_date)
    .bind(tier.loan_limit())
    .fetch_one(&mut *tx)
    .await?;

    let token = generate_token();
    sqlx::query("INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, tier = %tier, "User registered");

    let ctx = AuditContext {
        user_id: Some(user.id),
        ..ctx.clone()
    };
    recorder.created(&ctx, &user).await;
    recorder.created(&ctx, &profile).await;

    Ok(SessionResponse {
        token,
        user,
        profile: Some(profile),
    })
}
