//! Audit logging system for fundwatch
//!
//! Records every create, update, workflow, and archive operation with the
//! acting user and before/after values in an append-only audit log.
//!
//! # Architecture
//!
//! - `AuditEntry`: a single audit log entry with timestamp, operation, actor,
//!   entity information, and optional before/after values.
//! - `AuditLogger`: writes entries to the audit log file using a
//!   line-delimited JSON format (JSONL).
//! - `generate_diff`: creates human-readable diffs between entity states.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
