//! HTTP surface of the bridge.
//!
//! Every response is a JSON body with HTTP 200: bridge-local failures
//! are envelope-shaped (`{"status":"error","message":...}`), successful
//! relays are the controller's bytes verbatim. The browser panel keys
//! off `status`, not the HTTP status code.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use voltproto::{validate, BridgeError, Command};

use crate::config::BridgeConfig;
use crate::relay::RelayClient;

/// Server configuration, resolved from file/env/flags in `main`.
pub struct ServeConfig {
    pub port: u16,
    pub sequencer: String,
    pub timeout: Duration,
}

/// Shared state: the relay client plus health bookkeeping. Immutable
/// after startup - the bridge holds no sequence or transport state.
#[derive(Clone)]
pub struct BridgeState {
    pub relay: RelayClient,
    pub start_time: Instant,
}

/// Query parameters the GET entry point dispatches on.
///
/// `tempo` stays a raw string so garbage coerces through the same path
/// the original used instead of failing extraction.
#[derive(Debug, Deserialize)]
struct CommandQuery {
    command: Option<String>,
    tempo: Option<String>,
    get_sequences: Option<String>,
}

/// `GET /` - dispatch by query parameter: command, then tempo, then
/// get_sequences. Nothing recognized means "No command received".
async fn handle_get(State(state): State<BridgeState>, Query(q): Query<CommandQuery>) -> Response {
    let command = if let Some(tag) = q.command.as_deref() {
        Command::from_tag(tag)
    } else if let Some(raw) = q.tempo.as_deref() {
        match validate::validate_tempo(raw) {
            Ok(cmd) => cmd,
            Err(e) => return error_response(&e),
        }
    } else if q.get_sequences.is_some() {
        Command::GetSequences
    } else {
        return error_response(&BridgeError::NoCommand);
    };

    relay_response(&state, &command).await
}

/// `POST /` - sequence updates only; everything else on the body path
/// is unsupported.
async fn handle_post(State(state): State<BridgeState>, body: Bytes) -> Response {
    match validate::validate_post(&body) {
        Ok(command) => relay_response(&state, &command).await,
        Err(e) => error_response(&e),
    }
}

async fn handle_unsupported() -> Response {
    error_response(&BridgeError::UnsupportedMethod)
}

/// Bridge-local liveness. Never contacts the controller.
async fn handle_health(State(state): State<BridgeState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
        "sequencer": state.relay.endpoint(),
    }))
}

async fn relay_response(state: &BridgeState, command: &Command) -> Response {
    match state.relay.send(command).await {
        Ok(bytes) => json_bytes(bytes),
        Err(e) => {
            warn!(tag = command.tag(), error = %e, "relay failed");
            error_response(&e)
        }
    }
}

fn json_bytes(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
}

fn error_response(err: &BridgeError) -> Response {
    json_bytes(err.to_envelope().to_string().into_bytes())
}

/// Build the router. Split out from [`run`] so tests can serve it on an
/// ephemeral port.
pub fn router(state: BridgeState) -> Router {
    Router::new()
        .route(
            "/",
            get(handle_get)
                .post(handle_post)
                .fallback(handle_unsupported),
        )
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the bridge server.
pub async fn run(config: ServeConfig) -> Result<()> {
    info!("⚡ voltgate sequencer bridge starting");
    info!("   Sequencer: {}", config.sequencer);
    info!("   Timeout: {:?}", config.timeout);

    let state = BridgeState {
        relay: RelayClient::new(config.sequencer, config.timeout),
        start_time: Instant::now(),
    };
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("⚡ voltgate ready!");
    info!("   Commands: GET/POST http://{}/", addr);
    info!("   Health: GET http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolve a [`ServeConfig`] from file/env config plus CLI overrides.
pub fn resolve_config(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    sequencer: Option<String>,
    timeout_ms: Option<u64>,
) -> Result<(ServeConfig, BridgeConfig)> {
    let mut config = BridgeConfig::load(config_path.as_deref())?;
    if let Some(port) = port {
        config.bind.http_port = port;
    }
    if let Some(sequencer) = sequencer {
        config.sequencer.endpoint = sequencer;
    }
    if let Some(ms) = timeout_ms {
        config.sequencer.timeout_ms = ms;
    }

    let serve = ServeConfig {
        port: config.bind.http_port,
        sequencer: config.sequencer.endpoint.clone(),
        timeout: Duration::from_millis(config.sequencer.timeout_ms),
    };
    Ok((serve, config))
}

async fn shutdown_signal() {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM");
                sigterm.recv().await;
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
