// Snapshot publisher: builds a snapshot every tick and fans it out to /ws/snapshot subscribers.
// Stopping it (shutdown signal) halts scheduling only; the feed and its samples stay intact.

use crate::feed::TelemetryFeed;
use crate::mission_clock::MissionClock;
use crate::mission_phase::MissionPhaseTracker;
use crate::models::Snapshot;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for "no receivers" notice (avoid logging every tick when no one is on /ws/snapshot)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Feed, clock, phase, channels and shutdown for the publisher.
pub struct PublisherDeps {
    pub feed: Arc<TelemetryFeed>,
    pub clock: Arc<MissionClock>,
    pub phase: Arc<MissionPhaseTracker>,
    pub tx: broadcast::Sender<Snapshot>,
    pub ws_connections: Arc<AtomicUsize>,
    pub snapshots_published_total: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct PublisherConfig {
    pub snapshot_interval_ms: u64,
    /// How often to log feed stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Snapshot of the feed with this instant's mission clock and phase attached.
pub fn compose_snapshot(
    feed: &TelemetryFeed,
    clock: &MissionClock,
    phase: &MissionPhaseTracker,
) -> Snapshot {
    feed.build_snapshot()
        .with_clock(clock.reading())
        .with_phase(phase.reading())
}

pub fn spawn(deps: PublisherDeps, config: PublisherConfig) -> tokio::task::JoinHandle<()> {
    let PublisherDeps {
        feed,
        clock,
        phase,
        tx,
        ws_connections,
        snapshots_published_total,
        mut shutdown_rx,
    } = deps;
    let PublisherConfig {
        snapshot_interval_ms,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(snapshot_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_no_receivers_warn: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let snapshot = compose_snapshot(&feed, &clock, &phase);
                    snapshots_published_total.fetch_add(1, Ordering::Relaxed);
                    if tx.send(snapshot).is_err() {
                        let should_warn = last_no_receivers_warn
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                        if should_warn {
                            tracing::debug!(
                                operation = "broadcast_snapshot",
                                "No active WebSocket clients; broadcast channel has no receivers"
                            );
                            last_no_receivers_warn = Some(Instant::now());
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Publisher shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    let (accepted, rejected) = feed.ingest_totals();
                    tracing::info!(
                        ws_snapshot_clients = ws_connections.load(Ordering::Relaxed),
                        snapshots_published_total = snapshots_published_total.load(Ordering::Relaxed),
                        samples_accepted_total = accepted,
                        samples_rejected_total = rejected,
                        mission_elapsed = %clock.reading().formatted,
                        mission_phase = phase.current().as_str(),
                        "feed stats"
                    );
                }
            }
        }
    }
    .instrument(tracing::debug_span!("publisher", snapshot_interval_ms)))
}
