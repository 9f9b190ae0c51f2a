// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::feed::TelemetryFeed;
use crate::mission_clock::MissionClock;
use crate::mission_phase::MissionPhaseTracker;
use crate::models::Snapshot;

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<TelemetryFeed>,
    pub clock: Arc<MissionClock>,
    pub phase: Arc<MissionPhaseTracker>,
    pub snapshot_tx: broadcast::Sender<Snapshot>,
    pub ws_connections: Arc<AtomicUsize>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "CanSat telemetry feed" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/channels", get(http::channels_handler)) // GET /api/channels
        .route("/api/channels/{id}/history", get(http::history_handler)) // GET /api/channels/{id}/history
        .route("/api/snapshot", get(http::snapshot_handler)) // GET /api/snapshot
        .route("/api/samples", post(http::ingest_handler)) // POST /api/samples
        .route("/api/clock", get(http::clock_handler)) // GET /api/clock
        .route("/api/clock/start", post(http::clock_start_handler)) // POST /api/clock/start
        .route("/api/clock/pause", post(http::clock_pause_handler)) // POST /api/clock/pause
        .route("/api/clock/reset", post(http::clock_reset_handler)) // POST /api/clock/reset
        .route(
            "/api/mission/phase",
            get(http::phase_handler).post(http::phase_set_handler),
        ) // GET, POST /api/mission/phase
        .route("/api/mission/phase/advance", post(http::phase_advance_handler)) // POST /api/mission/phase/advance
        .route("/ws/snapshot", get(ws::ws_snapshot)) // WS /ws/snapshot
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
