//! Time-bounded correlation of created and deleted messages
//!
//! The platform forgets a message's author and body once it is deleted, so
//! every observed message is snapshotted here until either its deletion is
//! reported or it ages out of the retention window.

mod cache;
mod evictor;
mod snapshot;

pub use cache::{CacheStats, MessageCache};
pub use evictor::spawn_evictor;
pub use snapshot::{MessageSnapshot, UNKNOWN_CHANNEL};
