use slack_morphism::prelude::SlackMessageEventType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTs(pub String);

impl MessageTs {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Slack timestamps are only unique within a channel
pub fn message_id(channel: &ChannelId, ts: &MessageTs) -> String {
    format!("{}:{}", channel.as_str(), ts.as_str())
}

/// How a `message` push event maps onto the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A message carrying user content was posted
    Posted,
    /// A message was removed
    Deleted,
    /// Edits, joins, topic changes and the like
    Ignored,
}

impl MessageKind {
    pub fn from_subtype(subtype: Option<&SlackMessageEventType>) -> Self {
        match subtype {
            None => MessageKind::Posted,
            Some(SlackMessageEventType::ThreadBroadcast)
            | Some(SlackMessageEventType::FileShare) => MessageKind::Posted,
            Some(SlackMessageEventType::MessageDeleted) => MessageKind::Deleted,
            Some(_) => MessageKind::Ignored,
        }
    }
}

/// Direct and group-direct conversations have no workspace context
pub fn is_direct_conversation(channel_type: Option<&str>) -> bool {
    matches!(channel_type, Some("im") | Some("mpim"))
}
