// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use cansat_telemetry::config::AppConfig;
use cansat_telemetry::feed::TelemetryFeed;
use cansat_telemetry::mission_clock::MissionClock;
use cansat_telemetry::mission_phase::MissionPhaseTracker;
use cansat_telemetry::models::{
    ChannelInfo, ClockReading, HistoryPoint, MissionPhase, PhaseReading, PhaseState, Snapshot,
    Status,
};
use cansat_telemetry::routes::{self, AppState};
use common::TEST_CONFIG;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;

struct TestApp {
    app: axum::Router,
    feed: Arc<TelemetryFeed>,
    clock: Arc<MissionClock>,
    phase: Arc<MissionPhaseTracker>,
    tx: broadcast::Sender<Snapshot>,
}

fn test_app() -> TestApp {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let feed = Arc::new(
        TelemetryFeed::from_channels(config.feed.settings(), &config.channels).unwrap(),
    );
    let clock = Arc::new(MissionClock::default());
    let phase = Arc::new(MissionPhaseTracker::default());
    let (tx, _) = broadcast::channel(config.feed.broadcast_capacity);
    let app = routes::app(AppState {
        feed: feed.clone(),
        clock: clock.clone(),
        phase: phase.clone(),
        snapshot_tx: tx.clone(),
        ws_connections: Arc::new(AtomicUsize::new(0)),
    });
    TestApp {
        app,
        feed,
        clock,
        phase,
        tx,
    }
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = TestServer::new(test_app().app);
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("CanSat telemetry feed");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = TestServer::new(test_app().app);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("cansat-telemetry")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_channels_endpoint() {
    let server = TestServer::new(test_app().app);
    let response = server.get("/api/channels").await;
    response.assert_status_ok();
    let channels: Vec<ChannelInfo> = response.json();
    let ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["altitude", "voltage"]);
    assert_eq!(channels[0].warning_high, Some(15000.0));
    assert_eq!(channels[0].warning_low, None);
}

#[tokio::test]
async fn test_post_sample_then_snapshot() {
    let t = test_app();
    let server = TestServer::new(t.app);

    let response = server
        .post("/api/samples")
        .json(&serde_json::json!({ "channel": "altitude", "value": 16000.0 }))
        .await;
    response.assert_status(StatusCode::ACCEPTED);

    let snapshot: Snapshot = server.get("/api/snapshot").await.json();
    let altitude = snapshot.channel("altitude").unwrap();
    assert_eq!(altitude.latest_value, Some(16000.0));
    assert_eq!(altitude.status, Status::Warning);
    assert_eq!(snapshot.channel("voltage").unwrap().status, Status::Unknown);
    assert!(snapshot.clock.is_some());
    assert_eq!(
        snapshot.mission.map(|m| m.current),
        Some(MissionPhase::PreLaunch)
    );
    assert_eq!(t.feed.len("altitude").unwrap(), 1);
}

#[tokio::test]
async fn test_post_sample_errors_map_to_status_codes() {
    let t = test_app();
    let server = TestServer::new(t.app);

    let response = server
        .post("/api/samples")
        .json(&serde_json::json!({ "channel": "humidity", "value": 1.0 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("humidity"));

    let response = server
        .post("/api/samples")
        .json(&serde_json::json!({ "channel": "voltage", "value": 9.0 }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .post("/api/samples")
        .json(&serde_json::json!({ "channel": "voltage", "value": 3.8, "timestampMs": 500 }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    let response = server
        .post("/api/samples")
        .json(&serde_json::json!({ "channel": "voltage", "value": 3.9, "timestampMs": 400 }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    assert_eq!(t.feed.len("voltage").unwrap(), 1);
    assert_eq!(t.feed.ingest_totals(), (1, 2));
}

#[tokio::test]
async fn test_post_sample_with_unix_timestamp_is_refused() {
    let t = test_app();
    let server = TestServer::new(t.app);

    let response = server
        .post("/api/samples")
        .json(&serde_json::json!({
            "channel": "voltage",
            "value": 3.8,
            "timestampMs": 1_760_000_000_000u64
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("offsets since feed start"));

    // Later clock-stamped samples are not blocked by the refused one.
    server
        .post("/api/samples")
        .json(&serde_json::json!({ "channel": "voltage", "value": 3.8 }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert_eq!(t.feed.len("voltage").unwrap(), 1);
}

#[tokio::test]
async fn test_channel_history_endpoint() {
    let t = test_app();
    for (i, v) in [3.6, 3.7, 3.8, 3.9].into_iter().enumerate() {
        t.feed
            .ingest("voltage", v, std::time::Duration::from_millis(100 * (i as u64 + 1)))
            .unwrap();
    }
    let server = TestServer::new(t.app);

    let response = server.get("/api/channels/voltage/history").await;
    response.assert_status_ok();
    let points: Vec<HistoryPoint> = response.json();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![3.6, 3.7, 3.8, 3.9]);
    assert_eq!(points[0].timestamp_ms, 100);
    assert_eq!(points[3].timestamp_ms, 400);

    let points: Vec<HistoryPoint> = server
        .get("/api/channels/voltage/history")
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].value, 3.9);

    let points: Vec<HistoryPoint> = server.get("/api/channels/altitude/history").await.json();
    assert!(points.is_empty());

    let response = server.get("/api/channels/humidity/history").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("humidity"));
}

#[tokio::test]
async fn test_mission_phase_endpoints() {
    let t = test_app();
    let server = TestServer::new(t.app);

    let reading: PhaseReading = server.get("/api/mission/phase").await.json();
    assert_eq!(reading.current, MissionPhase::PreLaunch);
    assert_eq!(reading.steps[0].state, PhaseState::Active);

    let reading: PhaseReading = server.post("/api/mission/phase/advance").await.json();
    assert_eq!(reading.current, MissionPhase::Launch);
    assert_eq!(reading.steps[0].state, PhaseState::Complete);

    let reading: PhaseReading = server
        .post("/api/mission/phase")
        .json(&serde_json::json!({ "phase": "descent" }))
        .await
        .json();
    assert_eq!(reading.current, MissionPhase::Descent);
    assert_eq!(t.phase.current(), MissionPhase::Descent);

    server
        .post("/api/mission/phase")
        .json(&serde_json::json!({ "phase": "orbit" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .post("/api/mission/phase/advance")
        .await
        .assert_status_ok();
    let response = server.post("/api/mission/phase/advance").await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(t.phase.current(), MissionPhase::Recovery);
}

#[tokio::test]
async fn test_clock_control_endpoints() {
    let t = test_app();
    let server = TestServer::new(t.app);

    let reading: ClockReading = server.get("/api/clock").await.json();
    assert!(!reading.running);
    assert_eq!(reading.elapsed_ms, 0);

    let reading: ClockReading = server.post("/api/clock/start").await.json();
    assert!(reading.running);
    assert!(t.clock.is_running());

    let reading: ClockReading = server.post("/api/clock/pause").await.json();
    assert!(!reading.running);
    let frozen = reading.elapsed_ms;
    tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    let reading: ClockReading = server.get("/api/clock").await.json();
    assert_eq!(reading.elapsed_ms, frozen);

    let reading: ClockReading = server.post("/api/clock/reset").await.json();
    assert!(!reading.running);
    assert_eq!(reading.elapsed_ms, 0);
    assert_eq!(reading.formatted, "00:00:00");
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until we get JSON of the wanted shape (server sends a channel list first).

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_snapshot_sends_channel_list_first() {
    let t = test_app();
    let server = TestServer::builder().http_transport().build(t.app);
    let mut ws = server
        .get_websocket("/ws/snapshot")
        .await
        .into_websocket()
        .await;
    let welcome: serde_json::Value = receive_first_json_text(&mut ws).await;
    assert_eq!(welcome["type"], "channels");
    assert_eq!(welcome["channels"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_ws_snapshot_receives_broadcast() {
    let t = test_app();
    t.feed
        .ingest("voltage", 3.4, std::time::Duration::from_millis(10))
        .unwrap();
    let snapshot = t.feed.build_snapshot_at(std::time::Duration::from_millis(10));

    let server = TestServer::builder().http_transport().build(t.app);
    let mut ws = server
        .get_websocket("/ws/snapshot")
        .await
        .into_websocket()
        .await;
    let tx = t.tx.clone();
    let sent = snapshot.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let _ = tx.send(sent);
    });
    let received: Snapshot = receive_first_json_text(&mut ws).await;
    assert_eq!(received, snapshot);
    assert_eq!(
        received.channel("voltage").unwrap().status,
        Status::Warning
    );
}
