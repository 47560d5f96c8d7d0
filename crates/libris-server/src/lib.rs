//! Libris Server Library
//!
//! HTTP service for running a lending library with a full audit trail.
//!
//! # Overview
//!
//! - **Catalogue**: authors, genres and books
//! - **Lending**: loans with tier-based limits, returns and overdue sweeps
//! - **Accounts**: registration, token login and membership profiles
//! - **Audit trail**: field-level change history, statistics and XLSX export
//!
//! # Architecture
//!
//! Features are organised as CQRS slices under [`features`]:
//!
//! - **Commands** change state inside a transaction and, once committed,
//!   hand the before/after images to the [`audit::AuditRecorder`]
//! - **Queries** read state and are not audited
//!
//! Audit writes are best effort: a failure is logged and never fails the
//! request that caused it.
//!
//! # Example
//!
//! ```no_run
//! use libris_server::{api, config::Config, db, features::FeatureState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let state = FeatureState::new(pool, config.audit.clone());
//!     api::serve(state, &config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;

pub use error::{AppError, ServerError, ServerResult};
