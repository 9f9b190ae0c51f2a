// Snapshot builder: latest value, trend and status for every channel.

use std::time::Duration;

use super::{ChannelSlot, TelemetryFeed, status, trend};
use crate::error::FeedError;
use crate::models::{ChannelSnapshot, Snapshot, Status, Trend};

impl TelemetryFeed {
    pub fn build_snapshot(&self) -> Snapshot {
        self.build_snapshot_at(self.now())
    }

    /// Snapshot as of feed-clock offset `now` (staleness is judged against it).
    pub fn build_snapshot_at(&self, now: Duration) -> Snapshot {
        Snapshot {
            generated_at_ms: now.as_millis() as u64,
            generated_at_unix_ms: chrono::Utc::now().timestamp_millis().max(0) as u64,
            clock: None,
            mission: None,
            channels: self
                .slots
                .iter()
                .map(|slot| self.channel_snapshot(slot, now))
                .collect(),
        }
    }

    fn channel_snapshot(&self, slot: &ChannelSlot, now: Duration) -> ChannelSnapshot {
        let channel = &slot.channel;
        let (window, last_write, accepted, rejected) = {
            let state = slot.state.lock();
            let window: Vec<_> = state
                .buffer
                .recent(self.settings.trend_window)
                .copied()
                .collect();
            (window, state.last_write, state.accepted, state.rejected)
        };

        let Some(latest) = window.last().copied() else {
            return ChannelSnapshot {
                id: channel.id.clone(),
                unit: channel.unit.clone(),
                latest_value: None,
                status: Status::Unknown,
                trend: Trend::Stable,
                last_updated_ms: None,
                stale: false,
                accepted,
                rejected,
            };
        };

        let (status, stale) = match self.freshness(channel, last_write, now) {
            Ok(()) => (status::evaluate(&channel.thresholds, latest.value), false),
            Err(FeedError::Stale { .. }) => (Status::Unknown, true),
            Err(_) => (Status::Unknown, false),
        };

        ChannelSnapshot {
            id: channel.id.clone(),
            unit: channel.unit.clone(),
            latest_value: Some(latest.value),
            status,
            trend: trend::classify_samples(&window, channel.trend_epsilon),
            last_updated_ms: Some(latest.timestamp.as_millis() as u64),
            stale,
            accepted,
            rejected,
        }
    }
}
