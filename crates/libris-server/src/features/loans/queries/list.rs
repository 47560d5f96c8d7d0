use libris_common::types::LoanStatus;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::loans::LoanError;
use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::loan::{loan_select, Loan};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLoansQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    #[serde(skip)]
    pub borrower: Option<Uuid>,
}

impl crate::cqrs::middleware::Query for ListLoansQuery {}

const FILTER: &str = "($1::uuid IS NULL OR l.user_id = $1) AND ($2::text IS NULL OR l.status = $2)";

/// Loans newest first, limited to `query.borrower` when set
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &PgPool,
    query: ListLoansQuery,
) -> Result<(Vec<Loan>, PaginationMetadata), LoanError> {
    let pagination = PaginationParams::new(query.page, query.per_page);
    pagination
        .validate()
        .map_err(|e| LoanError::InvalidField(e.to_string()))?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<LoanStatus>)
        .transpose()?
        .map(LoanStatus::as_str);

    let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM loans l WHERE {FILTER}"))
        .bind(query.borrower)
        .bind(status)
        .fetch_one(pool)
        .await?;

    let loans = sqlx::query_as::<_, Loan>(&format!(
        "{} WHERE {FILTER} ORDER BY l.borrowed_at DESC LIMIT $3 OFFSET $4",
        loan_select()
    ))
    .bind(query.borrower)
    .bind(status)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok((loans, PaginationMetadata::from_params(&pagination, total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestAuthor, TestBook, TestUser};

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_borrower_scope_and_status(pool: PgPool) -> anyhow::Result<()> {
        let alice = TestUser::new("alice").insert(&pool).await?;
        let bob = TestUser::new("bob").insert(&pool).await?;
        let author = TestAuthor::new("Octavio", "Paz").insert(&pool).await?;

        for (user, status) in [(&alice, "active"), (&alice, "returned"), (&bob, "active")] {
            let book = TestBook::new(&author, "El laberinto de la soledad").insert(&pool).await?;
            sqlx::query(
                "INSERT INTO loans (book_id, user_id, due_date, status) VALUES ($1, $2, CURRENT_DATE, $3)",
            )
            .bind(book.id)
            .bind(user.id)
            .bind(status)
            .execute(&pool)
            .await?;
        }

        let (all, meta) = handle(&pool, ListLoansQuery::default()).await?;
        assert_eq!(all.len(), 3);
        assert_eq!(meta.total, 3);

        let (own, _) = handle(
            &pool,
            ListLoansQuery {
                borrower: Some(alice.id),
                status: Some("active".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].username, "alice");
        Ok(())
    }
}
