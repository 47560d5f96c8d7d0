use sqlx::PgPool;
use uuid::Uuid;

use crate::features::users::UserError;
use crate::models::User;

#[derive(Debug, Clone)]
pub struct GetUserQuery {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Query for GetUserQuery {}

pub async fn handle(pool: &PgPool, query: GetUserQuery) -> Result<User, UserError> {
    User::find(pool, query.id)
        .await?
        .ok_or(UserError::NotFound(query.id))
}
