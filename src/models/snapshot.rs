// Snapshot, status and trend models (wire format for the dashboard)

use serde::{Deserialize, Serialize};

use super::{ClockReading, PhaseReading};

/// Severity of a channel's current value; serializes to lowercase JSON (e.g. "warning").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Normal,
    Warning,
    Critical,
    /// Never reported, or stale.
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Warning => "warning",
            Status::Critical => "critical",
            Status::Unknown => "unknown",
        }
    }
}

/// Short-window direction of a channel's recent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

/// One raw reading held in a channel's ring buffer.
/// `timestamp` is an offset on the feed's monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub timestamp: std::time::Duration,
}

/// One point of a channel's chart history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub value: f64,
    /// Feed-clock milliseconds.
    pub timestamp_ms: u64,
}

impl From<Sample> for HistoryPoint {
    fn from(s: Sample) -> Self {
        Self {
            value: s.value,
            timestamp_ms: s.timestamp.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnapshot {
    pub id: String,
    pub unit: String,
    pub latest_value: Option<f64>,
    pub status: Status,
    pub trend: Trend,
    /// Feed-clock milliseconds of the latest sample.
    pub last_updated_ms: Option<u64>,
    #[serde(default)]
    pub stale: bool,
    #[serde(default)]
    pub accepted: u64,
    #[serde(default)]
    pub rejected: u64,
}

/// Everything the dashboard panels bind to for one tick. Built fresh each time; never mutated
/// after it is handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Feed-clock milliseconds.
    pub generated_at_ms: u64,
    pub generated_at_unix_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<PhaseReading>,
    pub channels: Vec<ChannelSnapshot>,
}

impl Snapshot {
    pub fn channel(&self, id: &str) -> Option<&ChannelSnapshot> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Attach the mission clock reading taken for this tick.
    pub fn with_clock(mut self, reading: ClockReading) -> Self {
        self.clock = Some(reading);
        self
    }

    pub fn with_phase(mut self, reading: PhaseReading) -> Self {
        self.mission = Some(reading);
        self
    }
}
