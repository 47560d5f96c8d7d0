//! Fixture builders for Libris integration tests

use libris_common::types::UserTier;
use sqlx::PgPool;
use uuid::Uuid;

// ============================================================================
// Account Fixtures
// ============================================================================

/// User with a profile and an API token
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub id: Uuid,
    pub username: String,
    pub tier: UserTier,
    pub token: String,
}

impl UserFixture {
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: Uuid::nil(),
            token: format!("token-{}", username),
            username,
            tier: UserTier::Free,
        }
    }

    pub fn librarian(username: impl Into<String>) -> Self {
        Self::new(username).with_tier(UserTier::Librarian)
    }

    pub fn with_tier(mut self, tier: UserTier) -> Self {
        self.tier = tier;
        self
    }

    pub async fn create(mut self, pool: &PgPool) -> sqlx::Result<Self> {
        let mut tx = pool.begin().await?;

        self.id = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $1 || '@libris.test', 'x') RETURNING id",
        )
        .bind(&self.username)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO profiles (user_id, tier, loan_limit) VALUES ($1, $2, $3)")
            .bind(self.id)
            .bind(self.tier.as_str())
            .bind(self.tier.loan_limit())
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2)")
            .bind(&self.token)
            .bind(self.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(self)
    }
}

// ============================================================================
// Catalogue Fixtures
// ============================================================================

pub async fn create_author(pool: &PgPool, first_name: &str, last_name: &str) -> sqlx::Result<Uuid> {
    sqlx::query_scalar("INSERT INTO authors (first_name, last_name) VALUES ($1, $2) RETURNING id")
        .bind(first_name)
        .bind(last_name)
        .fetch_one(pool)
        .await
}

pub async fn create_book(pool: &PgPool, author_id: Uuid, title: &str, isbn: &str) -> sqlx::Result<Uuid> {
    sqlx::query_scalar(
        "INSERT INTO books (title, author_id, isbn, publication_year) VALUES ($1, $2, $3, 1963) RETURNING id",
    )
    .bind(title)
    .bind(author_id)
    .bind(isbn)
    .fetch_one(pool)
    .await
}

// ============================================================================
// Audit Assertions
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
pub struct AuditRow {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub object_type: String,
    pub object_id: Option<Uuid>,
    pub changes: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

/// Audit rows of one object, oldest first
pub async fn audit_rows(pool: &PgPool, object_id: Uuid) -> sqlx::Result<Vec<AuditRow>> {
    sqlx::query_as::<_, AuditRow>(
        r#"
        SELECT user_id, action, object_type, object_id, changes, ip_address, user_agent
        FROM audit_log
        WHERE object_id = $1
        ORDER BY timestamp, action
        "#,
    )
    .bind(object_id)
    .fetch_all(pool)
    .await
}
