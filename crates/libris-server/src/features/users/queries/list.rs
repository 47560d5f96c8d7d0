use serde::Deserialize;
use sqlx::PgPool;

use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::features::users::UserError;
use crate::models::user::{User, USER_COLUMNS};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl crate::cqrs::middleware::Query for ListUsersQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    query: ListUsersQuery,
) -> Result<(Vec<User>, PaginationMetadata), UserError> {
    let pagination = PaginationParams::new(query.page, query.per_page);
    pagination.validate().map_err(UserError::Pagination)?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY username LIMIT $1 OFFSET $2"
    ))
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok((users, PaginationMetadata::from_params(&pagination, total)))
}
