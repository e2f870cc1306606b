//! Metadata cache for lazy-loading channel and user information

use crate::error::Result;
use crate::metadata::types::{ChannelInfo, UserInfo};
use crate::platform::ChannelResolver;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Where metadata comes from on a cache miss
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_channel_info(&self, channel_id: &str) -> Result<ChannelInfo>;
    async fn fetch_user_info(&self, user_id: &str) -> Result<UserInfo>;
}

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub channel_hits: u64,
    pub channel_misses: u64,
    pub user_hits: u64,
    pub user_misses: u64,
    pub api_calls: u64,
    pub api_errors: u64,
}

#[derive(Default)]
struct Counters {
    channel_hits: AtomicU64,
    channel_misses: AtomicU64,
    user_hits: AtomicU64,
    user_misses: AtomicU64,
    api_calls: AtomicU64,
    api_errors: AtomicU64,
}

/// Metadata cache with lazy-loading from the Slack API
///
/// Only channels and users that actually show up in events are fetched.
pub struct MetadataCache {
    source: Arc<dyn MetadataSource>,

    /// Channel metadata cache (lazy-populated)
    channels: DashMap<String, ChannelInfo>,

    /// User metadata cache (lazy-populated)
    users: DashMap<String, UserInfo>,

    /// Cache TTL (how long before refresh)
    ttl: Duration,

    stats: Counters,
}

impl MetadataCache {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self::with_ttl(source, Duration::from_secs(3600))
    }

    pub fn with_ttl(source: Arc<dyn MetadataSource>, ttl: Duration) -> Self {
        tracing::info!(
            ttl_secs = ttl.as_secs(),
            "Creating metadata cache with lazy-loading"
        );

        Self {
            source,
            channels: DashMap::new(),
            users: DashMap::new(),
            ttl,
            stats: Counters::default(),
        }
    }

    /// Get channel info (fetch if not cached or stale)
    pub async fn get_channel_info(&self, channel_id: &str) -> Result<ChannelInfo> {
        if let Some(info) = self.channels.get(channel_id) {
            if !info.is_stale(self.ttl) {
                self.stats.channel_hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    channel_id = %channel_id,
                    channel = %info.name,
                    "Channel cache hit"
                );
                return Ok(info.clone());
            }
            tracing::debug!(
                channel_id = %channel_id,
                age_secs = info.fetched_at.elapsed().as_secs(),
                "Channel cache entry stale"
            );
        }

        self.stats.channel_misses.fetch_add(1, Ordering::Relaxed);
        self.stats.api_calls.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(channel_id = %channel_id, "Channel cache miss, fetching from Slack API");

        match self.source.fetch_channel_info(channel_id).await {
            Ok(info) => {
                tracing::info!(
                    channel_id = %channel_id,
                    channel = %info.name,
                    "Fetched and cached channel info"
                );
                self.channels.insert(channel_id.to_string(), info.clone());
                Ok(info)
            }
            Err(e) => {
                self.stats.api_errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Get user info (fetch if not cached or stale)
    pub async fn get_user_info(&self, user_id: &str) -> Result<UserInfo> {
        if let Some(info) = self.users.get(user_id) {
            if !info.is_stale(self.ttl) {
                self.stats.user_hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(user_id = %user_id, user = %info.name, "User cache hit");
                return Ok(info.clone());
            }
            tracing::debug!(
                user_id = %user_id,
                age_secs = info.fetched_at.elapsed().as_secs(),
                "User cache entry stale"
            );
        }

        self.stats.user_misses.fetch_add(1, Ordering::Relaxed);
        self.stats.api_calls.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(user_id = %user_id, "User cache miss, fetching from Slack API");

        match self.source.fetch_user_info(user_id).await {
            Ok(info) => {
                tracing::info!(
                    user_id = %user_id,
                    user = %info.name,
                    "Fetched and cached user info"
                );
                self.users.insert(user_id.to_string(), info.clone());
                Ok(info)
            }
            Err(e) => {
                self.stats.api_errors.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Display identity of a message author, falling back to the raw id
    pub async fn author_name(&self, user_id: &str) -> String {
        match self.get_user_info(user_id).await {
            Ok(info) => info.best_name().to_string(),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to fetch user info, will use ID as fallback"
                );
                user_id.to_string()
            }
        }
    }

    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            channel_hits: self.stats.channel_hits.load(Ordering::Relaxed),
            channel_misses: self.stats.channel_misses.load(Ordering::Relaxed),
            user_hits: self.stats.user_hits.load(Ordering::Relaxed),
            user_misses: self.stats.user_misses.load(Ordering::Relaxed),
            api_calls: self.stats.api_calls.load(Ordering::Relaxed),
            api_errors: self.stats.api_errors.load(Ordering::Relaxed),
        }
    }

    /// Get current cache sizes
    pub fn cache_sizes(&self) -> (usize, usize) {
        (self.channels.len(), self.users.len())
    }

    /// Clear stale entries, returning how many channels and users were dropped
    pub fn cleanup_stale(&self) -> usize {
        let ttl = self.ttl;
        let initial_channels = self.channels.len();
        let initial_users = self.users.len();

        self.channels.retain(|_, info| !info.is_stale(ttl));
        self.users.retain(|_, info| !info.is_stale(ttl));

        let removed_channels = initial_channels.saturating_sub(self.channels.len());
        let removed_users = initial_users.saturating_sub(self.users.len());

        if removed_channels > 0 || removed_users > 0 {
            tracing::info!(
                removed_channels = removed_channels,
                removed_users = removed_users,
                remaining_channels = self.channels.len(),
                remaining_users = self.users.len(),
                "Cleaned up stale metadata cache entries"
            );
        }

        removed_channels + removed_users
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        let (channels, users) = self.cache_sizes();

        let hits = stats.channel_hits + stats.user_hits;
        let lookups = hits + stats.channel_misses + stats.user_misses;
        let hit_rate = if lookups > 0 {
            (hits as f32 / lookups as f32 * 100.0) as u32
        } else {
            0
        };

        tracing::info!(
            channels = channels,
            users = users,
            hit_rate = hit_rate,
            api_calls = stats.api_calls,
            api_errors = stats.api_errors,
            "Metadata cache statistics"
        );
    }
}

#[async_trait]
impl ChannelResolver for MetadataCache {
    async fn resolve_channel_label(&self, channel_id: &str) -> Result<String> {
        let info = self.get_channel_info(channel_id).await?;
        Ok(info.label().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModLoggerError;
    use std::time::Instant;

    #[derive(Default)]
    struct FakeSource {
        calls: AtomicU64,
    }

    #[async_trait]
    impl MetadataSource for FakeSource {
        async fn fetch_channel_info(&self, channel_id: &str) -> Result<ChannelInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if channel_id == "C404" {
                return Err(ModLoggerError::SlackApi("channel_not_found".to_string()));
            }
            Ok(ChannelInfo {
                id: channel_id.to_string(),
                name: "general".to_string(),
                fetched_at: Instant::now(),
            })
        }

        async fn fetch_user_info(&self, user_id: &str) -> Result<UserInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if user_id == "U404" {
                return Err(ModLoggerError::SlackApi("user_not_found".to_string()));
            }
            Ok(UserInfo {
                id: user_id.to_string(),
                name: "alice".to_string(),
                real_name: Some("Alice Liddell".to_string()),
                display_name: None,
                fetched_at: Instant::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_channel_lookups_are_cached() {
        let source = Arc::new(FakeSource::default());
        let cache = MetadataCache::new(source.clone());

        assert_eq!(cache.resolve_channel_label("C1").await.unwrap(), "general");
        assert_eq!(cache.resolve_channel_label("C1").await.unwrap(), "general");

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        let stats = cache.get_stats();
        assert_eq!(stats.channel_hits, 1);
        assert_eq!(stats.channel_misses, 1);
        assert_eq!(cache.cache_sizes(), (1, 0));
        cache.log_stats();
    }

    #[tokio::test]
    async fn test_failed_channel_lookup_is_an_error() {
        let cache = MetadataCache::new(Arc::new(FakeSource::default()));

        assert!(cache.resolve_channel_label("C404").await.is_err());
        assert_eq!(cache.get_stats().api_errors, 1);
        assert_eq!(cache.cache_sizes(), (0, 0));
    }

    #[tokio::test]
    async fn test_author_name_falls_back_to_id() {
        let cache = MetadataCache::new(Arc::new(FakeSource::default()));

        assert_eq!(cache.author_name("U1").await, "Alice Liddell");
        assert_eq!(cache.author_name("U404").await, "U404");
    }

    #[tokio::test]
    async fn test_stale_entries_are_refetched_and_cleaned() {
        let source = Arc::new(FakeSource::default());
        let cache = MetadataCache::with_ttl(source.clone(), Duration::ZERO);

        cache.get_channel_info("C1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        cache.get_channel_info("C1").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(cache.cleanup_stale(), 1);
        assert_eq!(cache.cache_sizes(), (0, 0));
    }
}
