//! HTTP control surface

use crate::control::SessionController;
use crate::correlation::MessageCache;
use crate::error::Result;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub const START_PATH: &str = "/bot/mod-logger/on";
pub const STOP_PATH: &str = "/bot/mod-logger/off";
pub const HEALTH_PATH: &str = "/health";

/// Shared state for the control routes
#[derive(Clone)]
pub struct ControlState {
    pub controller: Arc<SessionController>,
    pub cache: Arc<MessageCache>,
}

pub fn router(state: ControlState) -> Router {
    Router::new()
        .route(START_PATH, post(start_bot))
        .route(STOP_PATH, post(stop_bot))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
}

/// Serve the control routes on `listener` until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    state: ControlState,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(addr = %addr, "Control surface listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Control surface stopped");
    Ok(())
}

async fn start_bot(State(state): State<ControlState>) -> Response {
    match state.controller.start().await {
        Ok(outcome) => (StatusCode::OK, outcome.message()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start bot");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start bot: {}", e),
            )
                .into_response()
        }
    }
}

async fn stop_bot(State(state): State<ControlState>) -> Response {
    match state.controller.stop().await {
        Ok(outcome) => (StatusCode::OK, outcome.message()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to stop bot");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to stop bot: {}", e),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    running: bool,
    cached_messages: usize,
}

async fn health(State(state): State<ControlState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        running: state.controller.is_running(),
        cached_messages: state.cache.len(),
    })
}
