use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::audit::{Auditable, ObjectType};

/// Default catalogue language
pub const DEFAULT_LANGUAGE: &str = "Español";

/// Maximum ISBN length (ISBN-13 without separators)
pub const MAX_ISBN_LENGTH: usize = 13;

const BOOK_COLUMNS: &str = r#"
    b.id, b.title, b.author_id,
    a.first_name || ' ' || a.last_name AS author_name,
    b.genre_id, g.name AS genre_name,
    b.isbn, b.publication_year, b.publisher, b.page_count,
    b.language, b.description, b.status, b.created_at, b.updated_at
"#;

const BOOK_JOINS: &str = r#"
    JOIN authors a ON a.id = b.author_id
    LEFT JOIN genres g ON g.id = b.genre_id
"#;

/// `SELECT` of book rows with author and genre names, aliased `b`
pub fn book_select() -> String {
    format!("SELECT {BOOK_COLUMNS} FROM books b {BOOK_JOINS}")
}

/// Wrap an `INSERT`/`UPDATE ... RETURNING *` on books so it yields full rows
pub fn book_returning(statement: &str) -> String {
    format!("WITH b AS ({statement}) SELECT {BOOK_COLUMNS} FROM b {BOOK_JOINS}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub genre_id: Option<Uuid>,
    pub genre_name: Option<String>,
    pub isbn: String,
    pub publication_year: i32,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub language: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub async fn find<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Book>(&format!("{} WHERE b.id = $1", book_select()))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Fetch and lock the book row until the transaction ends
    pub async fn find_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Book>(&format!("{} WHERE b.id = $1 FOR UPDATE OF b", book_select()))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Set the circulation status and return the new image
    pub async fn set_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        status: &str,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Book>(&book_returning(
            "UPDATE books SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        ))
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await
    }

    /// Delete every book by `author_id`, returning the removed rows
    pub async fn delete_by_author<'e, E: PgExecutor<'e>>(
        executor: E,
        author_id: Uuid,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Book>(&book_returning(
            "DELETE FROM books WHERE author_id = $1 RETURNING *",
        ))
        .bind(author_id)
        .fetch_all(executor)
        .await
    }
}

impl Auditable for Book {
    const OBJECT_TYPE: ObjectType = ObjectType::Book;

    fn object_id(&self) -> Uuid {
        self.id
    }

    fn object_repr(&self) -> String {
        format!("{} - {}", self.title, self.author_name)
    }

    fn ignored_fields() -> &'static [&'static str] {
        &["updated_at", "author_name", "genre_name"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::diff;

    pub(crate) fn sample() -> Book {
        Book {
            id: Uuid::new_v4(),
            title: "Cien años de soledad".to_string(),
            author_id: Uuid::new_v4(),
            author_name: "Gabriel García Márquez".to_string(),
            genre_id: None,
            genre_name: None,
            isbn: "9780307350454".to_string(),
            publication_year: 1967,
            publisher: Some("Editorial Sudamericana".to_string()),
            page_count: Some(471),
            language: DEFAULT_LANGUAGE.to_string(),
            description: None,
            status: "available".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().object_repr(),
            "Cien años de soledad - Gabriel García Márquez"
        );
    }

    #[test]
    fn test_update_timestamp_is_not_diffed() {
        let before = sample();
        let mut after = before.clone();
        after.updated_at = before.updated_at + chrono::Duration::seconds(5);
        after.status = "on_loan".to_string();

        let changes = diff(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["status"]["old"], "available");
        assert_eq!(changes["status"]["new"], "on_loan");
    }
}
