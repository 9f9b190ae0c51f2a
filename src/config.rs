use serde::Deserialize;
use std::time::Duration;

use crate::feed::{
    DEFAULT_CAPACITY, DEFAULT_MAX_TIMESTAMP_LEAD, DEFAULT_TREND_EPSILON_FRACTION,
    DEFAULT_TREND_WINDOW, FeedSettings,
};
use crate::models::ChannelConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    pub monitoring: MonitoringConfig,
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Snapshot build/broadcast cadence.
    pub snapshot_interval_ms: u64,
    /// Max number of snapshots kept in the broadcast channel for /ws/snapshot (slow clients may lag).
    pub broadcast_capacity: usize,
    /// A channel silent for longer than this reports status "unknown".
    pub staleness_ms: u64,
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
    #[serde(default = "default_capacity")]
    pub default_capacity: usize,
    #[serde(default = "default_trend_epsilon_fraction")]
    pub trend_epsilon_fraction: f64,
    /// Furthest an incoming `timestampMs` may run ahead of the feed clock.
    #[serde(default = "default_max_timestamp_lead_ms")]
    pub max_timestamp_lead_ms: u64,
}

fn default_trend_window() -> usize {
    DEFAULT_TREND_WINDOW
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_trend_epsilon_fraction() -> f64 {
    DEFAULT_TREND_EPSILON_FRACTION
}

fn default_max_timestamp_lead_ms() -> u64 {
    DEFAULT_MAX_TIMESTAMP_LEAD.as_millis() as u64
}

impl FeedConfig {
    pub fn settings(&self) -> FeedSettings {
        FeedSettings {
            trend_window: self.trend_window,
            staleness: Duration::from_millis(self.staleness_ms),
            default_capacity: self.default_capacity,
            trend_epsilon_fraction: self.trend_epsilon_fraction,
            max_timestamp_lead: Duration::from_millis(self.max_timestamp_lead_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Start the mission clock at boot.
    #[serde(default = "default_true")]
    pub auto_start: bool,
    #[serde(default = "default_mission_duration_secs")]
    pub mission_duration_secs: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            mission_duration_secs: default_mission_duration_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_mission_duration_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sample_interval_ms: default_sample_interval_ms(),
            seed: None,
        }
    }
}

fn default_sample_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log feed stats (ws clients, snapshots published, samples accepted/rejected) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.feed.snapshot_interval_ms > 0,
            "feed.snapshot_interval_ms must be > 0, got {}",
            self.feed.snapshot_interval_ms
        );
        anyhow::ensure!(
            self.feed.broadcast_capacity > 0,
            "feed.broadcast_capacity must be > 0, got {}",
            self.feed.broadcast_capacity
        );
        anyhow::ensure!(
            self.feed.staleness_ms > 0,
            "feed.staleness_ms must be > 0, got {}",
            self.feed.staleness_ms
        );
        anyhow::ensure!(
            self.feed.trend_window >= 2,
            "feed.trend_window must be >= 2, got {}",
            self.feed.trend_window
        );
        anyhow::ensure!(
            self.feed.default_capacity > 0,
            "feed.default_capacity must be > 0, got {}",
            self.feed.default_capacity
        );
        anyhow::ensure!(
            self.feed.trend_epsilon_fraction.is_finite() && self.feed.trend_epsilon_fraction > 0.0,
            "feed.trend_epsilon_fraction must be > 0, got {}",
            self.feed.trend_epsilon_fraction
        );
        anyhow::ensure!(
            self.clock.mission_duration_secs > 0,
            "clock.mission_duration_secs must be > 0, got {}",
            self.clock.mission_duration_secs
        );
        anyhow::ensure!(
            self.simulator.sample_interval_ms > 0,
            "simulator.sample_interval_ms must be > 0, got {}",
            self.simulator.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            !self.channels.is_empty(),
            "channels must contain at least one [[channels]] entry"
        );
        Ok(())
    }
}
