//! Marker traits that classify slice operations

/// A state-changing operation. Handlers of commands write audit records.
pub trait Command: std::fmt::Debug {}

/// A read-only operation
pub trait Query: std::fmt::Debug {}
