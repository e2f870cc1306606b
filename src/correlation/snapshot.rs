use chrono::{DateTime, Utc};

/// Channel label used when the location of a message cannot be resolved
pub const UNKNOWN_CHANNEL: &str = "Unknown";

/// What a message looked like when it was posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    /// Raw message body, line breaks included
    pub content: String,

    /// Display identity of the sender
    pub author: String,

    /// Human-readable channel label, `"Unknown"` if unresolved at capture
    pub channel: String,

    /// Wall-clock insertion time; the only input to eviction
    pub captured_at: DateTime<Utc>,
}

impl MessageSnapshot {
    pub fn new(
        content: impl Into<String>,
        author: impl Into<String>,
        channel: impl Into<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
            channel: channel.into(),
            captured_at,
        }
    }

    /// Whether the snapshot is strictly older than `max_age` at `now`
    pub fn is_expired(&self, max_age: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.captured_at) > max_age
    }
}
