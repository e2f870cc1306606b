use crate::audit::{AuditEntry, AuditSink};
use crate::correlation::{MessageCache, MessageSnapshot, UNKNOWN_CHANNEL};
use crate::logging::log_error;
use crate::platform::{
    ChannelResolver, EventHandler, MessageCreated, MessageDeleted, PlatformEvent,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// What happened to a creation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Cached,
    IgnoredBot,
    IgnoredNoGuild,
}

/// What happened to a deletion event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The snapshot was found and consumed
    Recovered,
    /// No snapshot: evicted, already consumed, or never observed
    NotCached,
}

/// Routes platform events into the correlation cache and the audit trail
pub struct EventDispatcher {
    cache: Arc<MessageCache>,
    resolver: Arc<dyn ChannelResolver>,
    sink: Arc<dyn AuditSink>,
}

impl EventDispatcher {
    pub fn new(
        cache: Arc<MessageCache>,
        resolver: Arc<dyn ChannelResolver>,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            cache,
            resolver,
            sink,
        }
    }

    pub fn cache(&self) -> &Arc<MessageCache> {
        &self.cache
    }

    /// Snapshot a new message and record it
    pub async fn on_created(&self, event: MessageCreated) -> CreateOutcome {
        if event.is_bot {
            tracing::debug!(message_id = %event.id, "Ignoring bot message");
            return CreateOutcome::IgnoredBot;
        }
        if event.guild_id.is_none() {
            tracing::debug!(message_id = %event.id, "Ignoring message outside a workspace");
            return CreateOutcome::IgnoredNoGuild;
        }

        let channel = self.channel_label(&event.channel_id).await;
        let now = Utc::now();

        self.cache.put(
            event.id.clone(),
            MessageSnapshot::new(&event.content, &event.author, &channel, now),
        );

        tracing::debug!(
            message_id = %event.id,
            channel = %channel,
            author = %event.author,
            content_len = event.content.len(),
            "Cached message snapshot"
        );

        self.record(AuditEntry::message(now, channel, event.author, event.content))
            .await;

        CreateOutcome::Cached
    }

    /// Recover the snapshot of a deleted message, if still cached, and record it
    pub async fn on_deleted(&self, event: MessageDeleted) -> DeleteOutcome {
        let channel = self.channel_label(&event.channel_id).await;
        let now = Utc::now();

        // Lookup and removal happen in one critical section; the write
        // below runs after the lock is released.
        match self.cache.take_if_present(&event.id) {
            Some(snapshot) => {
                tracing::debug!(
                    message_id = %event.id,
                    channel = %channel,
                    author = %snapshot.author,
                    "Recovered deleted message"
                );
                self.record(AuditEntry::deleted(
                    now,
                    channel,
                    snapshot.author,
                    snapshot.content,
                ))
                .await;
                DeleteOutcome::Recovered
            }
            None => {
                tracing::debug!(
                    message_id = %event.id,
                    channel = %channel,
                    "Deleted message was not cached"
                );
                self.record(AuditEntry::deleted_not_cached(now, channel))
                    .await;
                DeleteOutcome::NotCached
            }
        }
    }

    async fn channel_label(&self, channel_id: &str) -> String {
        match self.resolver.resolve_channel_label(channel_id).await {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!(
                    channel_id = %channel_id,
                    error = %e,
                    "Failed to resolve channel, using fallback label"
                );
                UNKNOWN_CHANNEL.to_string()
            }
        }
    }

    async fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.sink.append(&entry).await {
            log_error(&format!("audit_append:{}", self.sink.name()), &e);
        }
    }
}

#[async_trait]
impl EventHandler for EventDispatcher {
    async fn handle(&self, event: PlatformEvent) {
        match event {
            PlatformEvent::Created(created) => {
                self.on_created(created).await;
            }
            PlatformEvent::Deleted(deleted) => {
                self.on_deleted(deleted).await;
            }
        }
    }
}
