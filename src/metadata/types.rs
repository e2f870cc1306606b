//! Metadata types for channel and author resolution

use std::time::{Duration, Instant};

/// Channel metadata information
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    /// Channel ID (e.g., C09NU1KFXHT)
    pub id: String,

    /// Channel name without # (e.g., "engineering", "general")
    pub name: String,

    /// When this info was last fetched
    pub fetched_at: Instant,
}

impl ChannelInfo {
    /// Check if this cache entry is stale (older than TTL)
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }

    /// Label written to the audit trail
    ///
    /// Direct conversations have no name, so their id stands in.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// User metadata information
#[derive(Debug, Clone)]
pub struct UserInfo {
    /// User ID (e.g., U09JDBT2MCM)
    pub id: String,

    /// Username/handle (e.g., "john.doe")
    pub name: String,

    /// Real name (e.g., "John Doe")
    pub real_name: Option<String>,

    /// Display name (what shows in Slack)
    pub display_name: Option<String>,

    /// When this info was last fetched
    pub fetched_at: Instant,
}

impl UserInfo {
    /// Check if this cache entry is stale
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }

    /// Get best available name for display
    ///
    /// Slack returns an empty display name for users who never set one.
    pub fn best_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.real_name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display_name: Option<&str>, real_name: Option<&str>) -> UserInfo {
        UserInfo {
            id: "U123".to_string(),
            name: "john.doe".to_string(),
            real_name: real_name.map(str::to_string),
            display_name: display_name.map(str::to_string),
            fetched_at: Instant::now(),
        }
    }

    #[test]
    fn test_user_info_best_name() {
        assert_eq!(user(Some("Johnny"), Some("John Doe")).best_name(), "Johnny");
        assert_eq!(user(None, Some("John Doe")).best_name(), "John Doe");
        assert_eq!(user(Some(""), Some("John Doe")).best_name(), "John Doe");
        assert_eq!(user(None, None).best_name(), "john.doe");
    }

    #[test]
    fn test_channel_label_falls_back_to_id() {
        let mut channel = ChannelInfo {
            id: "D123".to_string(),
            name: String::new(),
            fetched_at: Instant::now(),
        };
        assert_eq!(channel.label(), "D123");

        channel.name = "general".to_string();
        assert_eq!(channel.label(), "general");
    }

    #[test]
    fn test_staleness() {
        let channel = ChannelInfo {
            id: "C123".to_string(),
            name: "general".to_string(),
            fetched_at: Instant::now(),
        };
        assert!(!channel.is_stale(Duration::from_secs(60)));
    }
}
