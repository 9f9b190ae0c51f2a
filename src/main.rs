use anyhow::Result;
use cansat_telemetry::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    // Channel registration failures are fatal: a misconfigured channel never goes live.
    let feed = Arc::new(
        feed::TelemetryFeed::from_channels(app_config.feed.settings(), &app_config.channels)
            .map_err(|e| anyhow::anyhow!("channel registration: {}", e))?,
    );
    tracing::info!(
        channels = app_config.channels.len(),
        "Telemetry feed ready"
    );

    let clock = Arc::new(mission_clock::MissionClock::new(Duration::from_secs(
        app_config.clock.mission_duration_secs,
    )));
    if app_config.clock.auto_start {
        clock.start();
        tracing::info!("Mission clock started");
    }

    let phase = Arc::new(mission_phase::MissionPhaseTracker::default());

    let (tx, _) = broadcast::channel::<models::Snapshot>(app_config.feed.broadcast_capacity);
    let ws_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let publisher_handle = worker::spawn(
        worker::PublisherDeps {
            feed: feed.clone(),
            clock: clock.clone(),
            phase: phase.clone(),
            tx: tx.clone(),
            ws_connections: ws_connections.clone(),
            snapshots_published_total: Arc::new(AtomicU64::new(0)),
            shutdown_rx,
        },
        worker::PublisherConfig {
            snapshot_interval_ms: app_config.feed.snapshot_interval_ms,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    let synthetic_source = if app_config.simulator.enabled {
        let (sim_shutdown_tx, sim_shutdown_rx) = tokio::sync::oneshot::channel();
        let handle = simulator::spawn(
            feed.clone(),
            simulator::SimulatorConfig {
                sample_interval_ms: app_config.simulator.sample_interval_ms,
                seed: app_config.simulator.seed,
            },
            sim_shutdown_rx,
        );
        Some((sim_shutdown_tx, handle))
    } else {
        None
    };

    let app = routes::app(routes::AppState {
        feed,
        clock,
        phase,
        snapshot_tx: tx,
        ws_connections,
    });
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            if let Some((sim_shutdown_tx, handle)) = synthetic_source {
                let _ = sim_shutdown_tx.send(());
                let _ = handle.await;
            }
            let _ = shutdown_tx.send(());
            let _ = publisher_handle.await;
        }
    }

    Ok(())
}
