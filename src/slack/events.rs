use crate::error::{ModLoggerError, Result};
use crate::metadata::MetadataCache;
use crate::platform::{EventHandler, EventSource, MessageCreated, MessageDeleted, PlatformEvent};
use crate::slack::types::{MessageKind, is_direct_conversation, message_id};
use crate::slack::{ChannelId, MessageTs, SlackClient, UserId};
use async_trait::async_trait;
use slack_morphism::prelude::*;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

type SocketModeListener = SlackClientSocketModeListener<SlackClientHyperHttpsConnector>;

#[derive(Clone)]
struct ListenerState {
    handler: Arc<dyn EventHandler>,
    metadata_cache: Arc<MetadataCache>,
    permits: Arc<Semaphore>,
}

/// Delivers Slack message events over Socket Mode
pub struct SlackEventSource {
    slack_client: Arc<SlackClient>,
    metadata_cache: Arc<MetadataCache>,
    permits: Arc<Semaphore>,
    listener: Mutex<Option<SocketModeListener>>,
}

impl SlackEventSource {
    pub fn new(
        slack_client: Arc<SlackClient>,
        metadata_cache: Arc<MetadataCache>,
        max_concurrent_handlers: usize,
    ) -> Self {
        Self {
            slack_client,
            metadata_cache,
            permits: Arc::new(Semaphore::new(max_concurrent_handlers)),
            listener: Mutex::new(None),
        }
    }

    async fn handle_push_event(
        event: SlackPushEventCallback,
        _client: Arc<SlackHyperClient>,
        user_state: SlackClientEventsUserState,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let state: ListenerState = {
            let storage = user_state.read().await;
            match storage.get_user_state::<ListenerState>() {
                Some(state) => state.clone(),
                None => {
                    tracing::error!("Listener state missing, dropping event");
                    return Ok(());
                }
            }
        };

        let team_id = event.team_id.to_string();
        let SlackEventCallbackBody::Message(message) = event.event else {
            tracing::trace!("Ignoring non-message event");
            return Ok(());
        };

        // Process in the background so Slack gets its acknowledgement quickly
        tokio::spawn(async move {
            let _permit = match state.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            if let Some(event) = Self::translate(&state.metadata_cache, &team_id, message).await {
                tracing::debug!(
                    kind = event.kind(),
                    message_id = %event.message_id(),
                    "Dispatching platform event"
                );
                state.handler.handle(event).await;
            }
        });

        Ok(())
    }

    async fn translate(
        metadata_cache: &MetadataCache,
        team_id: &str,
        message: SlackMessageEvent,
    ) -> Option<PlatformEvent> {
        let Some(channel) = message.origin.channel.as_ref().map(|c| ChannelId::new(c.to_string()))
        else {
            tracing::debug!("Ignoring message without channel");
            return None;
        };

        match MessageKind::from_subtype(message.subtype.as_ref()) {
            MessageKind::Ignored => {
                tracing::debug!(subtype = ?message.subtype, "Ignoring message subtype");
                None
            }
            MessageKind::Deleted => {
                let Some(deleted_ts) = message.deleted_ts.as_ref() else {
                    tracing::warn!(
                        channel_id = %channel.as_str(),
                        "Deletion event without deleted_ts"
                    );
                    return None;
                };
                let ts = MessageTs::new(deleted_ts.to_string());
                Some(PlatformEvent::Deleted(MessageDeleted {
                    id: message_id(&channel, &ts),
                    channel_id: channel.0,
                }))
            }
            MessageKind::Posted => {
                let ts = MessageTs::new(message.origin.ts.to_string());
                let is_bot = message.sender.bot_id.is_some();
                let channel_type = message.origin.channel_type.as_ref().map(|t| t.0.as_str());
                let guild_id =
                    (!is_direct_conversation(channel_type)).then(|| team_id.to_string());

                // Skip the users.info round trip for events the dispatcher will drop
                let sender = message.sender.user.as_ref().map(|u| UserId::new(u.to_string()));
                let author = match sender {
                    Some(user) if !is_bot && guild_id.is_some() => {
                        metadata_cache.author_name(user.as_str()).await
                    }
                    Some(user) => user.0,
                    None => message
                        .sender
                        .username
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                };

                let content = message
                    .content
                    .as_ref()
                    .and_then(|c| c.text.clone())
                    .unwrap_or_default();

                Some(PlatformEvent::Created(MessageCreated {
                    id: message_id(&channel, &ts),
                    author,
                    content,
                    channel_id: channel.0,
                    guild_id,
                    is_bot,
                }))
            }
        }
    }

    fn error_handler(
        err: Box<dyn std::error::Error + Send + Sync>,
        _client: Arc<SlackHyperClient>,
        _states: SlackClientEventsUserState,
    ) -> HttpStatusCode {
        tracing::error!(
            error = %err,
            error_kind = std::any::type_name_of_val(&*err),
            "Slack event error"
        );
        HttpStatusCode::OK
    }
}

#[async_trait]
impl EventSource for SlackEventSource {
    fn name(&self) -> &'static str {
        "slack-socket-mode"
    }

    async fn start(&self, handler: Arc<dyn EventHandler>) -> Result<()> {
        let mut slot = self.listener.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let state = ListenerState {
            handler,
            metadata_cache: self.metadata_cache.clone(),
            permits: self.permits.clone(),
        };

        tracing::debug!("Creating listener environment");
        let listener_environment = Arc::new(
            SlackClientEventsListenerEnvironment::new(self.slack_client.get_client())
                .with_error_handler(Self::error_handler)
                .with_user_state(state),
        );

        let callbacks =
            SlackSocketModeListenerCallbacks::new().with_push_events(Self::handle_push_event);

        let listener = SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment,
            callbacks,
        );

        tracing::info!("Connecting to Slack via Socket Mode");
        listener
            .listen_for(self.slack_client.get_app_token())
            .await
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;
        listener.start().await;
        tracing::info!("Connected to Slack Socket Mode");

        *slot = Some(listener);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let listener = self.listener.lock().await.take();
        match listener {
            Some(listener) => {
                tracing::info!("Disconnecting from Slack Socket Mode");
                listener.shutdown().await;
                Ok(())
            }
            None => Err(ModLoggerError::Internal(
                "Socket Mode listener is not connected".to_string(),
            )),
        }
    }
}
