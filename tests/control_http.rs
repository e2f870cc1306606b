//! Integration test: serve the control surface on a free port and drive it
//! over HTTP. Does not require Slack.

use async_trait::async_trait;
use mod_logger::control::{
    self, ControlState, HEALTH_PATH, START_PATH, STOP_PATH, SessionController,
};
use mod_logger::correlation::MessageCache;
use mod_logger::error::{ModLoggerError, Result};
use mod_logger::platform::{EventHandler, EventSource, PlatformEvent};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct ToggleSource {
    refuse_start: AtomicBool,
    refuse_stop: AtomicBool,
}

#[async_trait]
impl EventSource for ToggleSource {
    fn name(&self) -> &'static str {
        "toggle"
    }

    async fn start(&self, _handler: Arc<dyn EventHandler>) -> Result<()> {
        if self.refuse_start.load(Ordering::SeqCst) {
            return Err(ModLoggerError::SlackApi("invalid_auth".to_string()));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if self.refuse_stop.load(Ordering::SeqCst) {
            return Err(ModLoggerError::SlackApi("socket_gone".to_string()));
        }
        Ok(())
    }
}

struct NoopHandler;

#[async_trait]
impl EventHandler for NoopHandler {
    async fn handle(&self, _event: PlatformEvent) {}
}

async fn spawn_control(source: Arc<ToggleSource>) -> (SocketAddr, CancellationToken) {
    // Initialize crypto provider for rustls
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("local_addr");

    let state = ControlState {
        controller: Arc::new(SessionController::new(source, Arc::new(NoopHandler))),
        cache: Arc::new(MessageCache::new()),
    };
    let shutdown = CancellationToken::new();
    tokio::spawn(control::serve(listener, state, shutdown.clone()));

    (addr, shutdown)
}

async fn post(client: &reqwest::Client, addr: SocketAddr, path: &str) -> (u16, String) {
    let resp = client
        .post(format!("http://{}{}", addr, path))
        .send()
        .await
        .expect("request");
    let status = resp.status().as_u16();
    (status, resp.text().await.expect("body"))
}

#[tokio::test]
async fn on_and_off_are_idempotent() {
    let (addr, shutdown) = spawn_control(Arc::new(ToggleSource::default())).await;
    let client = reqwest::Client::new();

    assert_eq!(
        post(&client, addr, STOP_PATH).await,
        (200, "Bot is not running.".to_string())
    );
    assert_eq!(
        post(&client, addr, START_PATH).await,
        (200, "Bot started successfully.".to_string())
    );
    assert_eq!(
        post(&client, addr, START_PATH).await,
        (200, "Bot is already running.".to_string())
    );

    let health: serde_json::Value = client
        .get(format!("http://{}{}", addr, HEALTH_PATH))
        .send()
        .await
        .expect("health request")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(health["status"], "ok");
    assert_eq!(health["running"], true);
    assert_eq!(health["cached_messages"], 0);

    assert_eq!(
        post(&client, addr, STOP_PATH).await,
        (200, "Bot stopped successfully.".to_string())
    );
    assert_eq!(
        post(&client, addr, STOP_PATH).await,
        (200, "Bot is not running.".to_string())
    );

    shutdown.cancel();
}

#[tokio::test]
async fn start_failure_returns_server_error() {
    let source = Arc::new(ToggleSource::default());
    source.refuse_start.store(true, Ordering::SeqCst);
    let (addr, shutdown) = spawn_control(source).await;
    let client = reqwest::Client::new();

    let (status, body) = post(&client, addr, START_PATH).await;
    assert_eq!(status, 500);
    assert!(body.starts_with("Failed to start bot:"));
    assert!(body.contains("invalid_auth"));

    shutdown.cancel();
}

#[tokio::test]
async fn stop_failure_returns_server_error_and_keeps_running() {
    let source = Arc::new(ToggleSource::default());
    let (addr, shutdown) = spawn_control(source.clone()).await;
    let client = reqwest::Client::new();

    assert_eq!(post(&client, addr, START_PATH).await.0, 200);

    source.refuse_stop.store(true, Ordering::SeqCst);
    let (status, body) = post(&client, addr, STOP_PATH).await;
    assert_eq!(status, 500);
    assert!(body.starts_with("Failed to stop bot:"));
    assert!(body.contains("socket_gone"));

    let health: serde_json::Value = client
        .get(format!("http://{}{}", addr, HEALTH_PATH))
        .send()
        .await
        .expect("health request")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(health["running"], true);

    shutdown.cancel();
}
