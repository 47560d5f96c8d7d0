use sqlx::PgPool;
use uuid::Uuid;

use crate::features::books::BookError;
use crate::models::Book;

#[derive(Debug, Clone)]
pub struct GetBookQuery {
    pub id: Uuid,
}

impl crate::cqrs::middleware::Query for GetBookQuery {}

pub async fn handle(pool: &PgPool, query: GetBookQuery) -> Result<Book, BookError> {
    Book::find(pool, query.id)
        .await?
        .ok_or(BookError::NotFound(query.id))
}
