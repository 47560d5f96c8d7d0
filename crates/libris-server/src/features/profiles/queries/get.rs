use sqlx::PgPool;
use uuid::Uuid;

use crate::features::profiles::ProfileError;
use crate::models::profile::{profile_select, Profile};

#[derive(Debug, Clone)]
pub struct GetProfileQuery {
    pub id: Uuid,
    /// Only the profile of this user is visible; `None` sees all
    pub owner: Option<Uuid>,
}

impl crate::cqrs::middleware::Query for GetProfileQuery {}

pub async fn handle(pool: &PgPool, query: GetProfileQuery) -> Result<Profile, ProfileError> {
    sqlx::query_as::<_, Profile>(&format!(
        "{} WHERE p.id = $1 AND ($2::uuid IS NULL OR p.user_id = $2)",
        profile_select()
    ))
    .bind(query.id)
    .bind(query.owner)
    .fetch_optional(pool)
    .await?
    .ok_or(ProfileError::NotFound(query.id))
}
