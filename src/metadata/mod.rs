//! Channel and user metadata for human-readable audit lines
//!
//! Key features:
//! - Lazy-loading: Only fetches metadata when an event references it
//! - TTL-based caching: 1-hour default (configurable)
//! - Resolution failures surface as errors; callers pick the fallback

mod cache;
mod types;

pub use cache::{CacheStats, MetadataCache, MetadataSource};
pub use types::{ChannelInfo, UserInfo};
