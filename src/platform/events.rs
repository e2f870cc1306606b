/// A new message was posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCreated {
    /// Platform-assigned id, unique across channels
    pub id: String,
    /// Display identity of the sender
    pub author: String,
    pub content: String,
    pub channel_id: String,
    /// Workspace/server the message was posted in; `None` for direct messages
    pub guild_id: Option<String>,
    pub is_bot: bool,
}

/// A message was removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDeleted {
    pub id: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Created(MessageCreated),
    Deleted(MessageDeleted),
}

impl PlatformEvent {
    pub fn message_id(&self) -> &str {
        match self {
            PlatformEvent::Created(e) => &e.id,
            PlatformEvent::Deleted(e) => &e.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlatformEvent::Created(_) => "created",
            PlatformEvent::Deleted(_) => "deleted",
        }
    }
}

impl From<MessageCreated> for PlatformEvent {
    fn from(event: MessageCreated) -> Self {
        PlatformEvent::Created(event)
    }
}

impl From<MessageDeleted> for PlatformEvent {
    fn from(event: MessageDeleted) -> Self {
        PlatformEvent::Deleted(event)
    }
}
