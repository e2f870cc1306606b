pub mod audit;
pub mod config;
pub mod control;
pub mod correlation;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod platform;
pub mod slack;

pub use error::{ModLoggerError, Result};
