//! Platform-facing seams
//!
//! The dispatcher never talks to Slack directly. It consumes
//! [`PlatformEvent`]s from an [`EventSource`] and asks a
//! [`ChannelResolver`] for channel names, so any platform (or a scripted
//! test double) can drive it.

mod events;
mod source;

pub use events::{MessageCreated, MessageDeleted, PlatformEvent};
pub use source::{ChannelResolver, EventHandler, EventSource};
