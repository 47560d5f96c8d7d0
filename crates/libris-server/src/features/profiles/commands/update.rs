//! Update a library profile
//!
//! Members edit their own contact details; only staff may move a profile
//! to another tier. The loan limit always follows the resulting tier.

use chrono::NaiveDate;
use libris_common::types::UserTier;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditContext, AuditRecorder};
use crate::features::profiles::ProfileError;
use crate::features::shared::validate_optional;
use crate::middleware::AuthUser;
use crate::models::profile::{profile_returning, profile_select, Profile};

const MAX_PHONE_LENGTH: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileCommand {
    #[serde(skip)]
    pub id: Uuid,
    pub tier: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

impl crate::cqrs::middleware::Command for UpdateProfileCommand {}

impl UpdateProfileCommand {
    /// Checks the fields, returning the requested tier if any
    pub fn validate(&self) -> Result<Option<UserTier>, ProfileError> {
        if self.tier.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.birth_date.is_none()
            && self.active.is_none()
        {
            return Err(ProfileError::NoFieldsToUpdate);
        }
        validate_optional(self.phone.as_deref(), "phone", MAX_PHONE_LENGTH)?;

        Ok(self
            .tier
            .as_deref()
            .map(str::parse::<UserTier>)
            .transpose()?)
    }
}

/// Resulting tier of an update; moving to a different tier needs staff
fn resolve_tier(
    actor: &AuthUser,
    current: UserTier,
    requested: Option<UserTier>,
) -> Result<UserTier, ProfileError> {
    match requested {
        Some(tier) if tier != current && !actor.is_staff() => {
            Err(ProfileError::TierChangeForbidden)
        },
        Some(tier) => Ok(tier),
        None => Ok(current),
    }
}

#[tracing::instrument(
    skip(pool, recorder, ctx, actor, command),
    fields(profile_id = %command.id, actor = %actor.username)
)]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    actor: &AuthUser,
    command: UpdateProfileCommand,
) -> Result<Profile, ProfileError> {
    let requested_tier = command.validate()?;
    let owner = if actor.is_staff() { None } else { Some(actor.id) };

    let mut tx = pool.begin().await?;

    let before = sqlx::query_as::<_, Profile>(&format!(
        "{} WHERE p.id = $1 AND ($2::uuid IS NULL OR p.user_id = $2) FOR UPDATE OF p",
        profile_select()
    ))
    .bind(command.id)
    .bind(owner)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ProfileError::NotFound(command.id))?;

    let tier = resolve_tier(actor, before.tier(), requested_tier)?;

    let after = sqlx::query_as::<_, Profile>(&profile_returning(
        r#"
        UPDATE profiles SET
            tier = $2,
            loan_limit = $3,
            phone = COALESCE($4, phone),
            address = COALESCE($5, address),
            birth_date = COALESCE($6, birth_date),
            active = COALESCE($7, active)
        WHERE id = $1
        RETURNING *
        "#,
    ))
    .bind(command.id)
    .bind(tier.as_str())
    .bind(tier.loan_limit())
    .bind(&command.phone)
    .bind(&command.address)
    .bind(command.birth_date)
    .bind(command.active)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    if before.tier != after.tier {
        tracing::info!(from = %before.tier, to = %after.tier, "Membership tier changed");
    }

    recorder.updated(ctx, &before, &after).await;
    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{test_state, TestUser};

    fn actor(tier: UserTier) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            username: "actor".to_string(),
            tier,
        }
    }

    #[test]
    fn test_tier_change_is_staff_only() {
        let member = actor(UserTier::Free);
        let librarian = actor(UserTier::Librarian);

        assert!(matches!(
            resolve_tier(&member, UserTier::Free, Some(UserTier::Premium)),
            Err(ProfileError::TierChangeForbidden)
        ));
        assert_eq!(
            resolve_tier(&librarian, UserTier::Free, Some(UserTier::Premium)).ok(),
            Some(UserTier::Premium)
        );
    }

    #[test]
    fn test_unchanged_tier_needs_no_staff() {
        let member = actor(UserTier::Premium);
        assert_eq!(
            resolve_tier(&member, UserTier::Premium, Some(UserTier::Premium)).ok(),
            Some(UserTier::Premium)
        );
        assert_eq!(
            resolve_tier(&member, UserTier::Premium, None).ok(),
            Some(UserTier::Premium)
        );
    }

    #[test]
    fn test_unknown_tier_is_rejected() {
        let command = UpdateProfileCommand {
            tier: Some("platinum".to_string()),
            ..Default::default()
        };
        assert!(command.validate().is_err());
    }

    #[test]
    fn test_contact_update_needs_no_staff() {
        let command = UpdateProfileCommand {
            phone: Some("+34 600 000 000".to_string()),
            ..Default::default()
        };
        assert_eq!(command.validate().ok(), Some(None));
        assert!(matches!(
            UpdateProfileCommand::default().validate(),
            Err(ProfileError::NoFieldsToUpdate)
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_upgrade_recomputes_limit(pool: PgPool) -> anyhow::Result<()> {
        let state = test_state(pool.clone());
        let member = TestUser::new("member").insert(&pool).await?;
        let librarian = TestUser::new("librarian")
            .with_tier(UserTier::Librarian)
            .insert(&pool)
            .await?;

        let profile_id: Uuid = sqlx::query_scalar("SELECT id FROM profiles WHERE user_id = $1")
            .bind(member.id)
            .fetch_one(&pool)
            .await?;

        let command = UpdateProfileCommand {
            id: profile_id,
            tier: Some("premium".to_string()),
            ..Default::default()
        };

        let refused = handle(
            &state.db,
            &state.recorder,
            &member.context(),
            &member.auth(),
            command.clone(),
        )
        .await;
        assert!(matches!(refused, Err(ProfileError::TierChangeForbidden)));

        let same_tier = handle(
            &state.db,
            &state.recorder,
            &member.context(),
            &member.auth(),
            UpdateProfileCommand {
                id: profile_id,
                tier: Some("free".to_string()),
                phone: Some("+54 11 5555 0000".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(same_tier.tier, "free");
        assert_eq!(same_tier.loan_limit, 3);
        assert_eq!(same_tier.phone.as_deref(), Some("+54 11 5555 0000"));

        let updated = handle(
            &state.db,
            &state.recorder,
            &librarian.context(),
            &librarian.auth(),
            command,
        )
        .await?;
        assert_eq!(updated.tier, "premium");
        assert_eq!(updated.loan_limit, 10);

        let changes: serde_json::Value = sqlx::query_scalar(
            "SELECT changes FROM audit_log WHERE object_id = $1 AND action = 'update' ORDER BY timestamp DESC LIMIT 1",
        )
        .bind(profile_id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(changes["loan_limit"]["new"], "10");
        assert_eq!(changes["tier"]["old"], "free");
        Ok(())
    }
}
