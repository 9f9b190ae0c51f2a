// Domain models: channels, samples, snapshots, clock readings, mission phases

mod channel;
mod clock;
mod phase;
mod snapshot;

pub use channel::{Bounds, Channel, ChannelConfig, ChannelInfo, Thresholds};
pub use clock::{ClockReading, format_hms};
pub use phase::{MissionPhase, PhaseReading, PhaseState, PhaseStep};
pub use snapshot::{ChannelSnapshot, HistoryPoint, Sample, Snapshot, Status, Trend};

use serde::{Deserialize, Serialize};

/// Body of `POST /api/samples`. Without `timestampMs` the feed stamps the sample on arrival.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRequest {
    pub channel: String,
    pub value: f64,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

/// Body of `POST /api/mission/phase`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRequest {
    pub phase: MissionPhase,
}
