//! Audit trail
//!
//! Every data-changing command records who changed what through the
//! [`AuditRecorder`]. The rest of the module reads that log back: filtered
//! listing, statistics and spreadsheet export, all limited to the caller's
//! [`AuditScope`] (staff see everything, other users their own records).
//!
//! # Example
//!
//! ```no_run
//! use libris_server::audit::{AuditContext, AuditRecorder, ObjectType};
//! use libris_server::models::Genre;
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool, genre: Genre) {
//! let recorder = AuditRecorder::new(pool, ObjectType::ALL);
//! recorder.created(&AuditContext::system(), &genre).await;
//! # }
//! ```

mod capture;
mod client;
mod export;
mod models;
mod queries;
pub mod routes;
mod statistics;

pub use capture::{diff, entry_for, render_value, AuditContext, AuditRecorder, Auditable};
pub use client::{client_ip, ClientInfo};
pub use export::{build_workbook, export_filename, ExportError, XLSX_CONTENT_TYPE};
pub use models::{
    AuditAction, AuditEntry, AuditQuery, AuditScope, CreateAuditEntry, ObjectType,
    DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT,
};
pub use queries::{
    count_audit_logs, create_audit_entry, export_rows, get_audit_entry, query_audit_logs,
};
pub use routes::audit_routes;
pub use statistics::{collect as collect_statistics, AuditStatistics};
