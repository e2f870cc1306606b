mod client;
mod events;
mod types;

pub use client::SlackClient;
pub use events::SlackEventSource;
pub use types::{ChannelId, MessageKind, MessageTs, UserId, is_direct_conversation, message_id};
