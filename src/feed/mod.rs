// Telemetry feed: channel registry, per-channel ring buffers, trend/status lookups.
// Channel table is fixed once the feed is shared; each channel's buffer sits behind its own
// lock so ingest on one channel never waits on a snapshot read of another.

mod ring_buffer;
mod snapshot;
pub mod status;
pub mod trend;

use ring_buffer::RingBuffer;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::FeedError;
use crate::models::{Channel, ChannelConfig, ChannelInfo, Sample, Status, Trend};

pub const DEFAULT_CAPACITY: usize = 64;
pub const DEFAULT_TREND_WINDOW: usize = 5;
pub const DEFAULT_STALENESS: Duration = Duration::from_secs(5);
pub const DEFAULT_TREND_EPSILON_FRACTION: f64 = 0.01;
pub const DEFAULT_MAX_TIMESTAMP_LEAD: Duration = Duration::from_secs(10);

/// Feed-wide tuning shared by every channel.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Samples considered by the trend classifier.
    pub trend_window: usize,
    /// A channel whose newest sample is older than this reports `Status::Unknown`.
    pub staleness: Duration,
    pub default_capacity: usize,
    /// Fraction of the normal operating span used as trend epsilon when a channel sets none.
    pub trend_epsilon_fraction: f64,
    /// How far past the feed clock an externally stamped sample may be.
    pub max_timestamp_lead: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            staleness: DEFAULT_STALENESS,
            default_capacity: DEFAULT_CAPACITY,
            trend_epsilon_fraction: DEFAULT_TREND_EPSILON_FRACTION,
            max_timestamp_lead: DEFAULT_MAX_TIMESTAMP_LEAD,
        }
    }
}

struct ChannelState {
    buffer: RingBuffer<Sample>,
    /// Timestamp of the last accepted sample.
    last_write: Option<Duration>,
    accepted: u64,
    rejected: u64,
}

struct ChannelSlot {
    channel: Channel,
    state: Mutex<ChannelState>,
}

pub struct TelemetryFeed {
    settings: FeedSettings,
    epoch: Instant,
    slots: Vec<ChannelSlot>,
    index: HashMap<String, usize>,
}

impl TelemetryFeed {
    pub fn new(settings: FeedSettings) -> Self {
        Self {
            settings,
            epoch: Instant::now(),
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a feed and register every channel; the first bad channel aborts.
    pub fn from_channels(
        settings: FeedSettings,
        channels: &[ChannelConfig],
    ) -> Result<Self, FeedError> {
        let mut feed = Self::new(settings);
        for config in channels {
            feed.register(config)?;
        }
        Ok(feed)
    }

    /// Validate and add a channel. On error the feed is left unchanged.
    pub fn register(&mut self, config: &ChannelConfig) -> Result<(), FeedError> {
        if self.index.contains_key(&config.id) {
            return Err(FeedError::DuplicateChannel(config.id.clone()));
        }
        let channel = Channel::from_config(
            config,
            self.settings.default_capacity,
            self.settings.trend_epsilon_fraction,
        )?;
        let state = ChannelState {
            buffer: RingBuffer::new(channel.capacity),
            last_write: None,
            accepted: 0,
            rejected: 0,
        };
        self.index.insert(channel.id.clone(), self.slots.len());
        self.slots.push(ChannelSlot {
            channel,
            state: Mutex::new(state),
        });
        Ok(())
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    /// Current offset on the feed's monotonic clock.
    pub fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn slot(&self, channel_id: &str) -> Result<&ChannelSlot, FeedError> {
        self.index
            .get(channel_id)
            .map(|&i| &self.slots[i])
            .ok_or_else(|| FeedError::UnknownChannel(channel_id.to_string()))
    }

    pub fn channel(&self, channel_id: &str) -> Result<&Channel, FeedError> {
        self.slot(channel_id).map(|s| &s.channel)
    }

    /// Registered channel ids in registration order.
    pub fn channel_ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.channel.id.as_str())
    }

    pub fn channel_infos(&self) -> Vec<ChannelInfo> {
        self.slots
            .iter()
            .map(|s| ChannelInfo::from(&s.channel))
            .collect()
    }

    /// Store one reading. Rejected readings are dropped and counted; the buffer is untouched.
    pub fn ingest(
        &self,
        channel_id: &str,
        value: f64,
        timestamp: Duration,
    ) -> Result<(), FeedError> {
        let slot = self.slot(channel_id)?;
        let channel = &slot.channel;
        let mut state = slot.state.lock();

        if !channel.bounds.contains(value) {
            state.rejected += 1;
            return Err(FeedError::OutOfRange {
                channel: channel.id.clone(),
                value,
                min: channel.bounds.min,
                max: channel.bounds.max,
            });
        }
        if let Some(newest) = state.buffer.newest()
            && timestamp <= newest.timestamp
        {
            let newest = newest.timestamp;
            state.rejected += 1;
            return Err(FeedError::OutOfOrder {
                channel: channel.id.clone(),
                timestamp,
                newest,
            });
        }

        state.buffer.push(Sample { value, timestamp });
        state.last_write = Some(timestamp);
        state.accepted += 1;
        Ok(())
    }

    /// `ingest` for a timestamp supplied by an outside source. A timestamp further ahead of the
    /// feed clock than `max_timestamp_lead` is refused, since accepting it would push every
    /// later sample on the channel out of order.
    pub fn ingest_external(
        &self,
        channel_id: &str,
        value: f64,
        timestamp: Duration,
    ) -> Result<(), FeedError> {
        let slot = self.slot(channel_id)?;
        let now = self.now();
        if timestamp > now + self.settings.max_timestamp_lead {
            slot.state.lock().rejected += 1;
            return Err(FeedError::AheadOfClock {
                channel: slot.channel.id.clone(),
                timestamp,
                now,
            });
        }
        self.ingest(channel_id, value, timestamp)
    }

    /// `ingest` stamped with the feed clock.
    pub fn ingest_now(&self, channel_id: &str, value: f64) -> Result<(), FeedError> {
        self.ingest(channel_id, value, self.now())
    }

    pub fn latest(&self, channel_id: &str) -> Result<Option<Sample>, FeedError> {
        let slot = self.slot(channel_id)?;
        Ok(slot.state.lock().buffer.newest().copied())
    }

    /// Up to `n` most recent samples, oldest first.
    pub fn recent(&self, channel_id: &str, n: usize) -> Result<Vec<Sample>, FeedError> {
        let slot = self.slot(channel_id)?;
        Ok(slot.state.lock().buffer.recent(n).copied().collect())
    }

    pub fn len(&self, channel_id: &str) -> Result<usize, FeedError> {
        let slot = self.slot(channel_id)?;
        Ok(slot.state.lock().buffer.len())
    }

    /// (accepted, rejected) summed over all channels.
    pub fn ingest_totals(&self) -> (u64, u64) {
        self.slots.iter().fold((0, 0), |(a, r), slot| {
            let state = slot.state.lock();
            (a + state.accepted, r + state.rejected)
        })
    }

    /// `Err(Stale)` when the last accepted sample is older than the staleness window at `now`.
    /// A channel that never reported is not stale; it has nothing to age.
    pub fn check_fresh(&self, channel_id: &str, now: Duration) -> Result<(), FeedError> {
        let slot = self.slot(channel_id)?;
        let last_write = slot.state.lock().last_write;
        self.freshness(&slot.channel, last_write, now)
    }

    fn freshness(
        &self,
        channel: &Channel,
        last_write: Option<Duration>,
        now: Duration,
    ) -> Result<(), FeedError> {
        match last_write {
            Some(at) if now.saturating_sub(at) > self.settings.staleness => {
                Err(FeedError::Stale {
                    channel: channel.id.clone(),
                    age: now.saturating_sub(at),
                })
            }
            _ => Ok(()),
        }
    }

    /// Trend over the configured window; `Stable` with fewer than two samples.
    pub fn classify(&self, channel_id: &str) -> Result<Trend, FeedError> {
        let slot = self.slot(channel_id)?;
        let window = self.window(slot);
        Ok(trend::classify_samples(
            &window,
            slot.channel.trend_epsilon,
        ))
    }

    /// Status of `value` against the channel's thresholds. Does not touch the buffer.
    pub fn evaluate(&self, channel_id: &str, value: f64) -> Result<Status, FeedError> {
        let channel = self.channel(channel_id)?;
        Ok(status::evaluate(&channel.thresholds, value))
    }

    fn window(&self, slot: &ChannelSlot) -> Vec<Sample> {
        slot.state
            .lock()
            .buffer
            .recent(self.settings.trend_window)
            .copied()
            .collect()
    }
}
