use crate::error::{ModLoggerError, Result};
use crate::platform::{EventHandler, EventSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

impl StartOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            StartOutcome::Started => "Bot started successfully.",
            StartOutcome::AlreadyRunning => "Bot is already running.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

impl StopOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            StopOutcome::Stopped => "Bot stopped successfully.",
            StopOutcome::NotRunning => "Bot is not running.",
        }
    }
}

/// Owns the running/stopped state of the platform subscription
///
/// Transitions are serialised by an async mutex so concurrent `start` and
/// `stop` requests observe and change the state atomically.
pub struct SessionController {
    source: Arc<dyn EventSource>,
    handler: Arc<dyn EventHandler>,
    transition: Mutex<()>,
    running: AtomicBool,
}

impl SessionController {
    pub fn new(source: Arc<dyn EventSource>, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            source,
            handler,
            transition: Mutex::new(()),
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Begin receiving platform events; a no-op if already running
    pub async fn start(&self) -> Result<StartOutcome> {
        let _guard = self.transition.lock().await;
        if self.is_running() {
            tracing::info!(source = self.source.name(), "Start requested while running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        tracing::info!(source = self.source.name(), "Starting event delivery");
        self.source
            .start(self.handler.clone())
            .await
            .map_err(|e| ModLoggerError::Control(e.to_string()))?;
        self.running.store(true, Ordering::Release);
        tracing::info!(source = self.source.name(), "Event delivery started");

        Ok(StartOutcome::Started)
    }

    /// Stop receiving platform events; a no-op if not running
    pub async fn stop(&self) -> Result<StopOutcome> {
        let _guard = self.transition.lock().await;
        if !self.is_running() {
            tracing::info!(source = self.source.name(), "Stop requested while stopped");
            return Ok(StopOutcome::NotRunning);
        }

        tracing::info!(source = self.source.name(), "Stopping event delivery");
        self.source
            .stop()
            .await
            .map_err(|e| ModLoggerError::Control(e.to_string()))?;
        self.running.store(false, Ordering::Release);
        tracing::info!(source = self.source.name(), "Event delivery stopped");

        Ok(StopOutcome::Stopped)
    }
}
