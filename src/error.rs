// Feed error taxonomy (per-sample, registration and staleness)

use std::time::Duration;

/// Errors raised by the telemetry feed.
///
/// Per-sample errors (`UnknownChannel`, `OutOfRange`, `OutOfOrder`, `AheadOfClock`) are handed back to the
/// caller, which logs them and carries on with the next reading. Registration errors
/// (`InvalidThresholdOrder`, `DuplicateChannel`, `InvalidChannel`) keep the channel out of the
/// feed. `Stale` never reaches snapshot consumers; it is folded into `Status::Unknown`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    #[error("channel '{channel}': value {value} outside physical bounds [{min}, {max}]")]
    OutOfRange {
        channel: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("channel '{channel}': sample at {timestamp:?} is not after newest sample at {newest:?}")]
    OutOfOrder {
        channel: String,
        timestamp: Duration,
        newest: Duration,
    },

    #[error(
        "channel '{channel}': timestamp {timestamp:?} is ahead of the feed clock ({now:?}); timestamps are offsets since feed start, not unix time"
    )]
    AheadOfClock {
        channel: String,
        timestamp: Duration,
        now: Duration,
    },

    #[error(
        "channel '{channel}': thresholds must satisfy critical_low <= warning_low <= warning_high <= critical_high"
    )]
    InvalidThresholdOrder { channel: String },

    #[error("channel '{0}' is already registered")]
    DuplicateChannel(String),

    #[error("channel '{channel}': {reason}")]
    InvalidChannel { channel: String, reason: String },

    #[error("channel '{channel}': no sample for {age:?}")]
    Stale { channel: String, age: Duration },
}
