use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::profiles::ProfileError;
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::profile::{profile_select, Profile};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProfilesQuery {
    pub tier: Option<String>,
    pub active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(skip)]
    pub owner: Option<Uuid>,
}

impl crate::cqrs::middleware::Query for ListProfilesQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    query: ListProfilesQuery,
) -> Result<(Vec<Profile>, PaginationMetadata), ProfileError> {
    let pagination = PaginationParams::new(query.page, query.per_page);
    pagination.validate().map_err(ProfileError::Pagination)?;

    let tier = query
        .tier
        .as_deref()
        .map(str::parse::<libris_common::types::UserTier>)
        .transpose()?;

    let filter = r#"
        WHERE ($1::uuid IS NULL OR p.user_id = $1)
          AND ($2::text IS NULL OR p.tier = $2)
          AND ($3::boolean IS NULL OR p.active = $3)
    "#;

    let total = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM profiles p {filter}"
    ))
    .bind(query.owner)
    .bind(tier.map(|t| t.as_str()))
    .bind(query.active)
    .fetch_one(pool)
    .await?;

    let profiles = sqlx::query_as::<_, Profile>(&format!(
        "{} {filter} ORDER BY u.username LIMIT $4 OFFSET $5",
        profile_select()
    ))
    .bind(query.owner)
    .bind(tier.map(|t| t.as_str()))
    .bind(query.active)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok((profiles, PaginationMetadata::from_params(&pagination, total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestUser;
    use libris_common::types::UserTier;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_members_only_list_their_own(pool: PgPool) -> anyhow::Result<()> {
        let ana = TestUser::new("ana").insert(&pool).await?;
        TestUser::new("bea").insert(&pool).await?;
        TestUser::new("staff")
            .with_tier(UserTier::Librarian)
            .insert(&pool)
            .await?;

        let (all, meta) = handle(&pool, ListProfilesQuery::default()).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(meta.total, 3);

        let (own, _) = handle(
            &pool,
            ListProfilesQuery {
                owner: Some(ana.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].username, "ana");

        let (staff, _) = handle(
            &pool,
            ListProfilesQuery {
                tier: Some("librarian".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].loan_limit, 50);
        Ok(())
    }
}
