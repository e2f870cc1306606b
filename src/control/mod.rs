//! On/off switch for platform event delivery

mod controller;
mod server;

pub use controller::{SessionController, StartOutcome, StopOutcome};
pub use server::{ControlState, HEALTH_PATH, START_PATH, STOP_PATH, router, serve};
