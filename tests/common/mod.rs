// Shared test helpers

#![allow(dead_code)]

use cansat_telemetry::feed::{FeedSettings, TelemetryFeed};
use cansat_telemetry::models::ChannelConfig;
use std::time::Duration;

pub const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[feed]
snapshot_interval_ms = 1000
broadcast_capacity = 10
staleness_ms = 5000

[monitoring]
stats_log_interval_secs = 60

[[channels]]
id = "altitude"
unit = "m"
warning_high = 15000.0
critical_high = 18000.0
min = 0.0
max = 40000.0

[[channels]]
id = "voltage"
unit = "V"
critical_low = 3.3
warning_low = 3.5
warning_high = 4.2
critical_high = 4.3
min = 0.0
max = 5.0
"#;

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

/// `altitude` with only high limits, as on the dashboard's altitude card.
pub fn altitude_channel() -> ChannelConfig {
    ChannelConfig {
        warning_high: Some(15000.0),
        critical_high: Some(18000.0),
        min: Some(0.0),
        max: Some(40000.0),
        ..ChannelConfig::new("altitude", "m")
    }
}

/// Normal band 50..150, so the default epsilon is 1.0 unit/s.
pub fn gauge_channel(id: &str) -> ChannelConfig {
    ChannelConfig {
        critical_low: Some(0.0),
        warning_low: Some(50.0),
        warning_high: Some(150.0),
        critical_high: Some(200.0),
        min: Some(-100.0),
        max: Some(1000.0),
        ..ChannelConfig::new(id, "u")
    }
}

pub fn feed_with(channels: &[ChannelConfig]) -> TelemetryFeed {
    TelemetryFeed::from_channels(FeedSettings::default(), channels).expect("valid channels")
}

/// Ingest `values` one second apart starting at t=1s.
pub fn ingest_series(feed: &TelemetryFeed, channel: &str, values: &[f64]) {
    for (i, &v) in values.iter().enumerate() {
        feed.ingest(channel, v, secs(i as u64 + 1)).expect("ingest");
    }
}
