// Synthetic data source: one bounded random walk per channel, fed through `ingest_now`.
// Stands in for the radio decoder when no vehicle is on the air.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::time::{Duration, interval};

use crate::feed::TelemetryFeed;
use crate::models::Channel;

/// Fraction of the walk range covered by one step at most.
const STEP_FRACTION: f64 = 0.02;

/// Random walk clamped to `[low, high]`, starting at the midpoint.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    value: f64,
    step: f64,
    low: f64,
    high: f64,
}

impl RandomWalk {
    pub fn new(low: f64, high: f64) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        Self {
            value: low + (high - low) / 2.0,
            step: (high - low) * STEP_FRACTION,
            low,
            high,
        }
    }

    /// Walk over the channel's normal band, falling back to physical or critical limits.
    pub fn for_channel(channel: &Channel) -> Self {
        let t = &channel.thresholds;
        let b = &channel.bounds;
        let low = [t.warning_low, b.min, t.critical_low]
            .into_iter()
            .find(|v| v.is_finite());
        let high = [t.warning_high, b.max, t.critical_high]
            .into_iter()
            .find(|v| v.is_finite());
        let (low, high) = match (low, high) {
            (Some(l), Some(h)) => (l, h),
            (Some(l), None) => (l, l + l.abs().max(100.0)),
            (None, Some(h)) => (h - h.abs().max(100.0), h),
            (None, None) => (0.0, 100.0),
        };
        // Keep clear of the inclusive warning limits so a quiet walk reads "normal".
        let margin = (high - low) * 0.05;
        Self::new(low + margin, high - margin)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn next_value<R: Rng>(&mut self, rng: &mut R) -> f64 {
        if self.step > 0.0 {
            let delta = rng.random_range(-self.step..=self.step);
            self.value = (self.value + delta).clamp(self.low, self.high);
        }
        self.value
    }
}

pub struct SimulatorConfig {
    pub sample_interval_ms: u64,
    pub seed: Option<u64>,
}

/// Spawns the synthetic source. Every tick pushes one sample per channel; rejects land in the
/// feed's per-channel counters and a debug log, never fatal.
pub fn spawn(
    feed: Arc<TelemetryFeed>,
    config: SimulatorConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut walks: Vec<(String, RandomWalk)> = feed
            .channel_ids()
            .filter_map(|id| feed.channel(id).ok())
            .map(|c| (c.id.clone(), RandomWalk::for_channel(c)))
            .collect();

        let mut tick = interval(Duration::from_millis(config.sample_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tracing::info!(
            channels = walks.len(),
            sample_interval_ms = config.sample_interval_ms,
            "Synthetic telemetry source started"
        );

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    for (id, walk) in walks.iter_mut() {
                        let value = walk.next_value(&mut rng);
                        if let Err(e) = feed.ingest_now(id, value) {
                            tracing::debug!(
                                channel = %id,
                                error = %e,
                                operation = "ingest",
                                "synthetic sample rejected"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Synthetic source shutting down");
                    break;
                }
            }
        }
    })
}
