//! Audit trail module
//!
//! Provides the audit records the engine produces and a structured writer
//! callers can use to persist them. The core never writes audit records
//! itself; they are part of the processing result.

pub mod entry;
pub mod logger;

pub use entry::{AuditEntry, RunSummary};
pub use logger::AuditLogger;
