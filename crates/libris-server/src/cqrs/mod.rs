//! CQRS building blocks
//!
//! Every feature slice splits its operations into commands (writes, always
//! audited through [`crate::audit::AuditRecorder`]) and queries (reads, never
//! audited). Handlers are plain async functions called from the routes.

pub mod middleware;

pub use middleware::{Command, Query};
