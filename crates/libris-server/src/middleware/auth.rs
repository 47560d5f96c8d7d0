//! Token authentication
//!
//! Clients send `Authorization: Token <key>` (or `Bearer <key>`). The key is
//! looked up in `auth_tokens` and resolved to the owning active user and the
//! tier of their profile.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use libris_common::types::UserTier;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub tier: UserTier,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.tier.is_staff()
    }

    /// Staff may act on anything, everyone else only on their own records
    pub fn can_access(&self, owner: Uuid) -> bool {
        self.is_staff() || self.id == owner
    }
}

/// Reasons a request carries no usable token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Authentication credentials were not provided")]
    Missing,
    #[error("Invalid token header")]
    Malformed,
    #[error("Invalid token")]
    Unknown,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// Extract the token key from the `Authorization` header
pub fn token_from_headers(headers: &HeaderMap) -> Result<&str, TokenError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(TokenError::Missing)?
        .to_str()
        .map_err(|_| TokenError::Malformed)?;

    let (scheme, key) = value.trim().split_once(' ').ok_or(TokenError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::Malformed);
    }

    let key = key.trim();
    if key.is_empty() || key.contains(' ') {
        return Err(TokenError::Malformed);
    }

    Ok(key)
}

#[derive(sqlx::FromRow)]
struct TokenOwner {
    id: Uuid,
    username: String,
    tier: String,
}

/// Resolve a token key to its active owner
pub async fn authenticate(pool: &PgPool, key: &str) -> Result<AuthUser, AppError> {
    let owner = sqlx::query_as::<_, TokenOwner>(
        r#"
        SELECT u.id, u.username, COALESCE(p.tier, 'free') AS tier
        FROM auth_tokens t
        JOIN users u ON u.id = t.user_id
        LEFT JOIN profiles p ON p.user_id = u.id
        WHERE t.key = $1 AND u.is_active
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await?
    .ok_or(TokenError::Unknown)?;

    Ok(AuthUser {
        id: owner.id,
        username: owner.username,
        tier: owner.tier.parse()?,
    })
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = token_from_headers(&parts.headers)?;
        let pool = PgPool::from_ref(state);
        authenticate(&pool, key).await
    }
}
