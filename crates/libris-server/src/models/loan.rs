use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::audit::{Auditable, ObjectType};

const LOAN_COLUMNS: &str = r#"
    l.id, l.book_id, b.title AS book_title, l.user_id, u.username,
    l.borrowed_at, l.due_date, l.returned_at, l.status, l.notes
"#;

const LOAN_JOINS: &str = r#"
    JOIN books b ON b.id = l.book_id
    JOIN users u ON u.id = l.user_id
"#;

/// `SELECT` of loan rows with book title and borrower name, aliased `l`
pub fn loan_select() -> String {
    format!("SELECT {LOAN_COLUMNS} FROM loans l {LOAN_JOINS}")
}

/// Wrap an `INSERT`/`UPDATE ... RETURNING *` on loans so it yields full rows
pub fn loan_returning(statement: &str) -> String {
    format!("WITH l AS ({statement}) SELECT {LOAN_COLUMNS} FROM l {LOAN_JOINS}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: String,
    pub user_id: Uuid,
    pub username: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: Option<String>,
}

impl Loan {
    pub async fn find<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Loan>(&format!("{} WHERE l.id = $1", loan_select()))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Fetch and lock the loan row until the transaction ends
    pub async fn find_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Loan>(&format!("{} WHERE l.id = $1 FOR UPDATE OF l", loan_select()))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Active and overdue loans held by `user_id`
    pub async fn count_outstanding<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND status IN ('active', 'overdue')",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Delete every loan of the given books, returning the removed rows
    pub async fn delete_for_books<'e, E: PgExecutor<'e>>(
        executor: E,
        book_ids: &[Uuid],
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Loan>(&loan_returning(
            "DELETE FROM loans WHERE book_id = ANY($1) RETURNING *",
        ))
        .bind(book_ids)
        .fetch_all(executor)
        .await
    }
}

impl Auditable for Loan {
    const OBJECT_TYPE: ObjectType = ObjectType::Loan;

    fn object_id(&self) -> Uuid {
        self.id
    }

    fn object_repr(&self) -> String {
        format!("{} - {}", self.book_title, self.username)
    }

    fn ignored_fields() -> &'static [&'static str] {
        &["book_title", "username"]
    }
}
