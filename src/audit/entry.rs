use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Author rendered for a deletion whose snapshot was not cached
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Content rendered for a deletion whose snapshot was not cached
pub const NOT_CACHED_CONTENT: &str = "Unknown (not cached)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKind {
    Message,
    Deleted,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::Message => "MESSAGE",
            AuditKind::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the audit trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub kind: AuditKind,
    pub timestamp: DateTime<Utc>,
    pub channel: String,
    pub author: String,
    pub content: String,
}

impl AuditEntry {
    pub fn message(
        timestamp: DateTime<Utc>,
        channel: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind: AuditKind::Message,
            timestamp,
            channel: channel.into(),
            author: author.into(),
            content: content.into(),
        }
    }

    pub fn deleted(
        timestamp: DateTime<Utc>,
        channel: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind: AuditKind::Deleted,
            timestamp,
            channel: channel.into(),
            author: author.into(),
            content: content.into(),
        }
    }

    /// Deletion of a message whose snapshot is gone or was never taken
    pub fn deleted_not_cached(timestamp: DateTime<Utc>, channel: impl Into<String>) -> Self {
        Self::deleted(timestamp, channel, UNKNOWN_AUTHOR, NOT_CACHED_CONTENT)
    }

    /// Render the entry as a single audit line, without the trailing newline
    ///
    /// With `escape_newlines` off the content is written verbatim and may
    /// span several physical lines.
    pub fn format_line(&self, escape_newlines: bool) -> String {
        let content = if escape_newlines {
            escape_line_breaks(&self.content)
        } else {
            self.content.clone()
        };

        format!(
            "[{}] | [{}] | Channel: {} | Author: {} | Content: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.kind,
            self.channel,
            self.author,
            content
        )
    }
}

/// Replace carriage returns and line feeds with their escaped forms
pub fn escape_line_breaks(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}
