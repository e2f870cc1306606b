use mod_logger::audit::FileAuditSink;
use mod_logger::config::load_settings;
use mod_logger::control::{self, ControlState, SessionController};
use mod_logger::correlation::{MessageCache, spawn_evictor};
use mod_logger::dispatch::EventDispatcher;
use mod_logger::error::Result;
use mod_logger::logging::Timer;
use mod_logger::metadata::MetadataCache;
use mod_logger::slack::{SlackClient, SlackEventSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mod_logger=info,slack_morphism=warn")),
        )
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting moderation logger");

    // Missing credentials end the process here, before any event is handled
    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e);
        }
    };
    tracing::info!("Configuration loaded");
    tracing::debug!(
        audit_log = ?settings.audit.log_path,
        retention_secs = settings.cache.retention.as_secs(),
        sweep_interval_secs = settings.cache.sweep_interval.as_secs(),
        "Config"
    );

    let slack_client = Arc::new(SlackClient::new(&settings.slack)?);
    tracing::info!("Slack client created");

    let metadata_cache = Arc::new(MetadataCache::with_ttl(
        slack_client.clone(),
        settings.cache.metadata_ttl,
    ));

    let message_cache = Arc::new(MessageCache::new());
    let audit_sink = Arc::new(FileAuditSink::new(
        settings.audit.log_path.clone(),
        settings.audit.escape_newlines,
    ));

    let dispatcher = Arc::new(EventDispatcher::new(
        message_cache.clone(),
        metadata_cache.clone(),
        audit_sink,
    ));

    let event_source = Arc::new(SlackEventSource::new(
        slack_client.clone(),
        metadata_cache.clone(),
        settings.slack.max_concurrent_handlers,
    ));
    let controller = Arc::new(SessionController::new(event_source, dispatcher));

    let shutdown = CancellationToken::new();

    let evictor = spawn_evictor(
        message_cache.clone(),
        settings.cache.retention,
        settings.cache.sweep_interval,
        shutdown.clone(),
    );
    let metadata_sweeper = spawn_metadata_sweeper(
        metadata_cache.clone(),
        settings.cache.metadata_ttl,
        shutdown.clone(),
    );

    if settings.control.auto_start {
        tracing::info!("Auto-start enabled");
        controller.start().await?;
    }

    // Bind failure is a startup failure
    let listener = tokio::net::TcpListener::bind(settings.control.bind_addr).await?;
    let control_state = ControlState {
        controller: controller.clone(),
        cache: message_cache.clone(),
    };
    let server = tokio::spawn(control::serve(listener, control_state, shutdown.clone()));

    let signal_name = setup_shutdown_handler().await;
    tracing::info!(
        signal = %signal_name,
        "Received shutdown signal, initiating shutdown"
    );

    shutdown.cancel();

    if controller.is_running() {
        match tokio::time::timeout(Duration::from_secs(5), controller.stop()).await {
            Ok(Ok(outcome)) => tracing::info!(outcome = ?outcome, "Event delivery stopped"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to stop event delivery"),
            Err(_) => tracing::warn!("Timed out stopping event delivery"),
        }
    }

    let _ = evictor.await;
    let _ = metadata_sweeper.await;
    match server.await {
        Ok(Err(e)) => tracing::warn!(error = %e, "Control surface exited with error"),
        Err(e) => tracing::warn!(error = %e, "Control surface task failed"),
        Ok(Ok(())) => {}
    }

    message_cache.log_stats();
    metadata_cache.log_stats();
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Drop channel and user names that have outlived their TTL
fn spawn_metadata_sweeper(
    metadata_cache: Arc<MetadataCache>,
    ttl: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ttl.max(Duration::from_secs(60)));
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let mut timer = Timer::new("metadata_cleanup_stale");
                    timer.record_removed(metadata_cache.cleanup_stale());
                    drop(timer);
                    metadata_cache.log_stats();
                }
            }
        }
    })
}

/// Setup signal handlers for shutdown
/// Handles SIGINT (Ctrl+C), SIGTERM, and SIGQUIT on Unix systems
async fn setup_shutdown_handler() -> String {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        let mut sigquit = signal(SignalKind::quit()).expect("Failed to setup SIGQUIT handler");

        tokio::select! {
            _ = sigint.recv() => {
                tracing::debug!("Caught SIGINT signal");
                "SIGINT (Ctrl+C)".to_string()
            }
            _ = sigterm.recv() => {
                tracing::debug!("Caught SIGTERM signal");
                "SIGTERM".to_string()
            }
            _ = sigquit.recv() => {
                tracing::debug!("Caught SIGQUIT signal");
                "SIGQUIT".to_string()
            }
        }
    }

    #[cfg(not(unix))]
    {
        // On Windows, only handle Ctrl+C
        signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        tracing::debug!("Caught Ctrl+C signal");
        "Ctrl+C".to_string()
    }
}
