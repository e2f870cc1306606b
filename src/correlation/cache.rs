//! Message correlation cache

use crate::correlation::MessageSnapshot;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub inserts: u64,
    pub overwrites: u64,
    pub hits: u64,
    pub misses: u64,
    pub evicted: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, MessageSnapshot>,
    stats: CacheStats,
}

/// Maps a message id to the snapshot taken when the message was posted
///
/// A single mutex guards the whole map. Every operation is one critical
/// section, so a lookup and its removal can never be interleaved with
/// another handler or with an eviction sweep. Nothing in here performs I/O
/// while the lock is held; logging happens after the guard is dropped.
#[derive(Default)]
pub struct MessageCache {
    inner: Mutex<Inner>,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the snapshot for `id` (last write wins)
    pub fn put(&self, id: impl Into<String>, snapshot: MessageSnapshot) {
        let id = id.into();
        let replaced = {
            let mut inner = self.inner.lock();
            let replaced = inner.entries.insert(id.clone(), snapshot).is_some();
            inner.stats.inserts += 1;
            if replaced {
                inner.stats.overwrites += 1;
            }
            replaced
        };

        if replaced {
            tracing::debug!(message_id = %id, "Overwrote cached snapshot");
        }
    }

    /// Remove and return the snapshot for `id`, if any
    ///
    /// At most one caller ever receives a given snapshot; every later call
    /// for the same id observes absence until it is `put` again.
    pub fn take_if_present(&self, id: &str) -> Option<MessageSnapshot> {
        let mut inner = self.inner.lock();
        let taken = inner.entries.remove(id);
        if taken.is_some() {
            inner.stats.hits += 1;
        } else {
            inner.stats.misses += 1;
        }
        taken
    }

    /// Drop every snapshot captured more than `max_age` before `now`
    ///
    /// Returns the number of entries removed.
    pub fn evict_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::TimeDelta::MAX);

        let (removed, remaining) = {
            let mut inner = self.inner.lock();
            let before = inner.entries.len();
            inner
                .entries
                .retain(|_, snapshot| !snapshot.is_expired(max_age, now));
            let removed = before - inner.entries.len();
            inner.stats.evicted += removed as u64;
            (removed, inner.entries.len())
        };

        if removed > 0 {
            tracing::info!(
                removed = removed,
                remaining = remaining,
                max_age_secs = max_age.num_seconds(),
                "Evicted expired message snapshots"
            );
        }

        removed
    }

    /// Whether a snapshot for `id` is currently held
    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats.clone()
    }

    /// Log cache statistics (for periodic monitoring)
    pub fn log_stats(&self) {
        let (stats, cached) = {
            let inner = self.inner.lock();
            (inner.stats.clone(), inner.entries.len())
        };

        let hit_rate = if stats.hits + stats.misses > 0 {
            (stats.hits as f32 / (stats.hits + stats.misses) as f32 * 100.0) as u32
        } else {
            0
        };

        tracing::info!(
            cached = cached,
            inserts = stats.inserts,
            overwrites = stats.overwrites,
            deletion_hit_rate = hit_rate,
            evicted = stats.evicted,
            "Message cache statistics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    const DAY: Duration = Duration::from_secs(24 * 3600);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn snapshot(author: &str, content: &str, at: DateTime<Utc>) -> MessageSnapshot {
        MessageSnapshot::new(content, author, "general", at)
    }

    #[test]
    fn test_take_consumes_at_most_once() {
        let cache = MessageCache::new();
        cache.put("m1", snapshot("alice", "hi", t0()));

        let first = cache.take_if_present("m1");
        let second = cache.take_if_present("m1");

        assert_eq!(first.map(|s| s.author), Some("alice".to_string()));
        assert!(second.is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites_previous_snapshot() {
        let cache = MessageCache::new();
        cache.put("m4", snapshot("bob", "first", t0()));
        cache.put("m4", snapshot("bob2", "edited", t0()));

        assert_eq!(cache.len(), 1);
        let taken = cache.take_if_present("m4").unwrap();
        assert_eq!(taken.author, "bob2");
        assert_eq!(taken.content, "edited");

        let stats = cache.stats();
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.overwrites, 1);
    }

    #[test]
    fn test_take_missing_is_absence_not_error() {
        let cache = MessageCache::new();
        assert!(cache.take_if_present("never-seen").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_evict_removes_only_expired_entries() {
        let cache = MessageCache::new();
        cache.put("old", snapshot("alice", "old", t0()));
        cache.put(
            "fresh",
            snapshot("bob", "fresh", t0() + chrono::Duration::hours(20)),
        );

        let removed = cache.evict_older_than(DAY, t0() + chrono::Duration::hours(25));

        assert_eq!(removed, 1);
        assert!(!cache.contains("old"));
        assert!(cache.contains("fresh"));
        assert_eq!(cache.stats().evicted, 1);
    }

    #[test]
    fn test_evict_keeps_entry_exactly_at_boundary() {
        let cache = MessageCache::new();
        cache.put("m", snapshot("alice", "hi", t0()));

        assert_eq!(cache.evict_older_than(DAY, t0() + chrono::Duration::hours(24)), 0);
        assert!(cache.contains("m"));
    }

    #[test]
    fn test_take_after_eviction_observes_absence() {
        let cache = MessageCache::new();
        cache.put("m3", snapshot("carol", "bye", t0()));
        cache.evict_older_than(DAY, t0() + chrono::Duration::hours(25));

        assert!(cache.take_if_present("m3").is_none());
    }

    #[test]
    fn test_retention_bound_with_hourly_sweeps() {
        // Entries inserted at arbitrary minutes must be gone by the first
        // hourly sweep after retention + one interval.
        let cache = MessageCache::new();
        for minute in 0..120 {
            cache.put(
                format!("m{}", minute),
                snapshot("alice", "x", t0() + chrono::Duration::minutes(minute)),
            );
        }

        let mut sweep = t0();
        while !cache.is_empty() {
            sweep += chrono::Duration::hours(1);
            cache.evict_older_than(DAY, sweep);
        }

        let last_insert = t0() + chrono::Duration::minutes(119);
        assert!(sweep - last_insert <= chrono::Duration::hours(25));
    }

    #[test]
    fn test_concurrent_access_keeps_map_consistent() {
        let cache = Arc::new(MessageCache::new());
        let writers = 8;
        let per_writer = 500;

        let handles: Vec<_> = (0..writers)
            .map(|w| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    let mut taken = 0;
                    for i in 0..per_writer {
                        let id = format!("w{}-{}", w, i);
                        cache.put(id.clone(), snapshot("alice", "hi", t0()));
                        if i % 2 == 0 && cache.take_if_present(&id).is_some() {
                            taken += 1;
                        }
                        if i % 100 == 0 {
                            // Nothing is old enough yet
                            cache.evict_older_than(DAY, t0());
                        }
                    }
                    taken
                })
            })
            .collect();

        let taken: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(taken, writers * per_writer / 2);
        assert_eq!(cache.len(), writers * per_writer / 2);
    }

    #[test]
    fn test_concurrent_duplicate_takes_yield_single_winner() {
        let cache = Arc::new(MessageCache::new());
        cache.put("dup", snapshot("alice", "hi", t0()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.take_if_present("dup").is_some())
            })
            .collect();

        let winners = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
