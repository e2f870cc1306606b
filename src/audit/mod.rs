//! Durable audit trail of posted and deleted messages

mod entry;
mod sink;

pub use entry::{AuditEntry, AuditKind, NOT_CACHED_CONTENT, UNKNOWN_AUTHOR, escape_line_breaks};
pub use sink::{AuditSink, FileAuditSink, MemoryAuditSink};
