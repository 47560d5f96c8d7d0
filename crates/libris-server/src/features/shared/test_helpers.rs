//! Database fixtures for slice tests
//!
//! ```rust,ignore
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_something(pool: PgPool) -> sqlx::Result<()> {
//!     let reader = TestUser::new("reader").insert(&pool).await?;
//!     let author = TestAuthor::new("Julio", "Cortázar").insert(&pool).await?;
//!     let book = TestBook::new(&author, "Rayuela").insert(&pool).await?;
//!     // ...
//!     Ok(())
//! }
//! ```

use libris_common::types::UserTier;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::AuditContext;
use crate::config::AuditConfig;
use crate::features::FeatureState;
use crate::middleware::AuthUser;

/// Account with profile and token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub tier: UserTier,
    pub token: String,
}

impl TestUser {
    pub fn new(username: &str) -> Self {
        Self {
            id: Uuid::nil(),
            username: username.to_string(),
            tier: UserTier::Free,
            token: format!("token-{}", username),
        }
    }

    pub fn with_tier(mut self, tier: UserTier) -> Self {
        self.tier = tier;
        self
    }

    pub async fn insert(mut self, pool: &PgPool) -> sqlx::Result<Self> {
        self.id = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $1 || '@libris.test', 'not-a-hash')
            RETURNING id
            "#,
        )
        .bind(&self.username)
        .fetch_one(pool)
        .await?;

        sqlx::query("INSERT INTO profiles (user_id, tier, loan_limit) VALUES ($1, $2, $3)")
            .bind(self.id)
            .bind(self.tier.as_str())
            .bind(self.tier.loan_limit())
            .execute(pool)
            .await?;

        sqlx::query("INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2)")
            .bind(&self.token)
            .bind(self.id)
            .execute(pool)
            .await?;

        Ok(self)
    }

    pub fn auth(&self) -> AuthUser {
        AuthUser {
            id: self.id,
            username: self.username.clone(),
            tier: self.tier,
        }
    }

    pub fn context(&self) -> AuditContext {
        AuditContext {
            user_id: Some(self.id),
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: "libris-tests".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestAuthor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl TestAuthor {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            id: Uuid::nil(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    pub async fn insert(mut self, pool: &PgPool) -> sqlx::Result<Self> {
        self.id = sqlx::query_scalar(
            "INSERT INTO authors (first_name, last_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(&self.first_name)
        .bind(&self.last_name)
        .fetch_one(pool)
        .await?;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct TestBook {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub isbn: String,
    pub status: String,
}

impl TestBook {
    pub fn new(author: &TestAuthor, title: &str) -> Self {
        Self {
            id: Uuid::nil(),
            author_id: author.id,
            title: title.to_string(),
            isbn: format!("{:013}", Uuid::new_v4().as_u128() % 10_000_000_000_000),
            status: "available".to_string(),
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub async fn insert(mut self, pool: &PgPool) -> sqlx::Result<Self> {
        self.id = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, isbn, publication_year, status)
            VALUES ($1, $2, $3, 1963, $4)
            RETURNING id
            "#,
        )
        .bind(&self.title)
        .bind(self.author_id)
        .bind(&self.isbn)
        .bind(&self.status)
        .fetch_one(pool)
        .await?;
        Ok(self)
    }
}

/// Feature state recording every object type
pub fn test_state(pool: PgPool) -> FeatureState {
    FeatureState::new(pool, AuditConfig::default())
}

/// Audit entries for one object, oldest first
pub async fn audit_actions(pool: &PgPool, object_id: Uuid) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar("SELECT action FROM audit_log WHERE object_id = $1 ORDER BY timestamp")
        .bind(object_id)
        .fetch_all(pool)
        .await
}
