use crate::error::Result;
use crate::platform::PlatformEvent;
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves a channel id into a human-readable label
#[async_trait]
pub trait ChannelResolver: Send + Sync {
    async fn resolve_channel_label(&self, channel_id: &str) -> Result<String>;
}

/// Receives events from an [`EventSource`]
///
/// Handlers may be invoked concurrently, in any order, and more than once
/// for the same event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: PlatformEvent);
}

/// A subscription to platform events that can be opened and closed
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Name of the source, for diagnostics
    fn name(&self) -> &'static str;

    /// Connect and begin delivering events to `handler`
    async fn start(&self, handler: Arc<dyn EventHandler>) -> Result<()>;

    /// Disconnect; no further events are delivered afterwards
    async fn stop(&self) -> Result<()>;
}
