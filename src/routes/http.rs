// HTTP handlers: version, channels, history, snapshot, sample ingest, mission clock and phase

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::time::Duration;

use super::AppState;
use crate::error::FeedError;
use crate::models::{HistoryPoint, PhaseRequest, SampleRequest};
use crate::version::{NAME, VERSION};
use crate::worker::compose_snapshot;

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/channels — registered channels with their effective limits.
pub(super) async fn channels_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feed.channel_infos())
}

/// Points per chart when the client does not ask for a count.
const DEFAULT_HISTORY_POINTS: usize = 50;

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    limit: Option<usize>,
}

/// GET /api/channels/{id}/history?limit=N — buffered samples, oldest first (default 50).
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_POINTS);
    match state.feed.recent(&id, limit) {
        Ok(samples) => {
            let points: Vec<HistoryPoint> = samples.into_iter().map(HistoryPoint::from).collect();
            (StatusCode::OK, Json(serde_json::json!(points)))
        }
        Err(e) => (
            feed_error_status(&e),
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// GET /api/snapshot — built on demand, independent of the publisher cadence.
pub(super) async fn snapshot_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(compose_snapshot(&state.feed, &state.clock, &state.phase))
}

fn feed_error_status(e: &FeedError) -> StatusCode {
    match e {
        FeedError::UnknownChannel(_) => StatusCode::NOT_FOUND,
        FeedError::OutOfRange { .. } | FeedError::AheadOfClock { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        FeedError::OutOfOrder { .. } => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// POST /api/samples — one reading from an external decoder. Rejects are reported, not fatal.
pub(super) async fn ingest_handler(
    State(state): State<AppState>,
    Json(req): Json<SampleRequest>,
) -> impl IntoResponse {
    let result = match req.timestamp_ms {
        Some(ms) => {
            state
                .feed
                .ingest_external(&req.channel, req.value, Duration::from_millis(ms))
        }
        None => state.feed.ingest_now(&req.channel, req.value),
    };
    match result {
        Ok(()) => (StatusCode::ACCEPTED, Json(serde_json::json!({ "accepted": true }))),
        Err(e) => {
            tracing::debug!(
                channel = %req.channel,
                error = %e,
                operation = "ingest",
                "sample rejected"
            );
            (
                feed_error_status(&e),
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

/// GET /api/clock
pub(super) async fn clock_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.clock.reading())
}

/// POST /api/clock/start — start or resume; no-op while running.
pub(super) async fn clock_start_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.clock.start() {
        tracing::info!("Mission clock started");
    }
    Json(state.clock.reading())
}

/// POST /api/clock/pause
pub(super) async fn clock_pause_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.clock.pause() {
        tracing::info!("Mission clock paused");
    }
    Json(state.clock.reading())
}

/// POST /api/clock/reset — zero and stop.
pub(super) async fn clock_reset_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.clock.reset();
    tracing::info!("Mission clock reset");
    Json(state.clock.reading())
}

/// GET /api/mission/phase
pub(super) async fn phase_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.phase.reading())
}

/// POST /api/mission/phase — operator override, forwards or back.
pub(super) async fn phase_set_handler(
    State(state): State<AppState>,
    Json(req): Json<PhaseRequest>,
) -> impl IntoResponse {
    let previous = state.phase.set(req.phase);
    if previous != req.phase {
        tracing::info!(
            from = previous.as_str(),
            to = req.phase.as_str(),
            "Mission phase set"
        );
    }
    Json(state.phase.reading())
}

/// POST /api/mission/phase/advance — 409 once in recovery.
pub(super) async fn phase_advance_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.phase.advance() {
        Some(phase) => {
            tracing::info!(phase = phase.as_str(), "Mission phase advanced");
            (StatusCode::OK, Json(serde_json::json!(state.phase.reading())))
        }
        None => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": "mission is already in its final phase" })),
        ),
    }
}
