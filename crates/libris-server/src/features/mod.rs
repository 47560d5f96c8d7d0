//! Feature slices of the Libris API
//!
//! Each catalogue and account resource is a vertical slice:
//! - `commands/` - write operations, each one audited
//! - `queries/` - read operations
//! - `routes.rs` - HTTP handlers
//! - `error.rs` - the slice's error type and its HTTP mapping
//!
//! # Features
//!
//! - **authors**, **genres**: catalogue metadata
//! - **books**: catalogue entries and lending
//! - **loans**: returns, due dates, overdue sweeps
//! - **users**: registration and token sessions
//! - **profiles**: membership tiers and loan limits

pub mod authors;
pub mod books;
pub mod genres;
pub mod loans;
pub mod profiles;
pub mod shared;
pub mod users;

use axum::{extract::FromRef, Router};
use sqlx::PgPool;

use crate::audit::{audit_routes, AuditRecorder};
use crate::config::AuditConfig;

/// State handed to every feature handler
#[derive(Clone, FromRef)]
pub struct FeatureState {
    pub db: PgPool,
    pub recorder: AuditRecorder,
    pub audit: AuditConfig,
}

impl FeatureState {
    pub fn new(db: PgPool, audit: AuditConfig) -> Self {
        let recorder = AuditRecorder::new(db.clone(), audit.tracked_types.iter().copied());
        Self {
            db,
            recorder,
            audit,
        }
    }
}

/// Mount every slice under its path prefix
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/audit", audit_routes())
        .nest("/users", users::users_routes())
        .nest("/profiles", profiles::profiles_routes())
        .nest("/authors", authors::authors_routes())
        .nest("/genres", genres::genres_routes())
        .nest("/books", books::books_routes())
        .nest("/loans", loans::loans_routes())
        .with_state(state)
}
