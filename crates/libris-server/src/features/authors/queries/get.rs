use sqlx::PgPool;
use uuid::Uuid;

use crate::features::authors::AuthorError;
use crate::models::Author;

#[derive(Debug, Clone)]
pub struct GetAuthorQuery {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Query for GetAuthorQuery {}

pub async fn handle(pool: &PgPool, query: GetAuthorQuery) -> Result<Author, AuthorError> {
    Author::find(pool, query.id)
        .await?
        .ok_or(AuthorError::NotFound(query.id))
}
