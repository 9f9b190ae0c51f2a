// Channel configuration, thresholds and physical bounds

use serde::{Deserialize, Serialize};

use super::Status;
use crate::error::FeedError;

/// One `[[channels]]` entry as read from config. Omitted limits are unbounded.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    pub unit: String,
    pub warning_low: Option<f64>,
    pub warning_high: Option<f64>,
    pub critical_low: Option<f64>,
    pub critical_high: Option<f64>,
    /// Physical lower bound; samples below it are rejected as out of range.
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Ring buffer capacity; the feed default applies when omitted.
    pub capacity: Option<usize>,
    /// Absolute trend slope threshold in units per second.
    pub trend_epsilon: Option<f64>,
}

impl ChannelConfig {
    /// Unbounded channel with no thresholds; tweak fields from here.
    pub fn new(id: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unit: unit.into(),
            warning_low: None,
            warning_high: None,
            critical_low: None,
            critical_high: None,
            min: None,
            max: None,
            capacity: None,
            trend_epsilon: None,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            critical_low: self.critical_low.unwrap_or(f64::NEG_INFINITY),
            warning_low: self.warning_low.unwrap_or(f64::NEG_INFINITY),
            warning_high: self.warning_high.unwrap_or(f64::INFINITY),
            critical_high: self.critical_high.unwrap_or(f64::INFINITY),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.min.unwrap_or(f64::NEG_INFINITY),
            max: self.max.unwrap_or(f64::INFINITY),
        }
    }
}

/// Warning and critical limits. Unbounded sides hold `±inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub critical_low: f64,
    pub warning_low: f64,
    pub warning_high: f64,
    pub critical_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            critical_low: f64::NEG_INFINITY,
            warning_low: f64::NEG_INFINITY,
            warning_high: f64::INFINITY,
            critical_high: f64::INFINITY,
        }
    }
}

impl Thresholds {
    /// `critical_low <= warning_low <= warning_high <= critical_high`; false if any limit is NaN.
    pub fn is_ordered(&self) -> bool {
        self.critical_low <= self.warning_low
            && self.warning_low <= self.warning_high
            && self.warning_high <= self.critical_high
    }

    /// Classify a value. Critical wins over warning; limits are inclusive.
    pub fn evaluate(&self, value: f64) -> Status {
        if value <= self.critical_low || value >= self.critical_high {
            Status::Critical
        } else if value <= self.warning_low || value >= self.warning_high {
            Status::Warning
        } else {
            Status::Normal
        }
    }

    /// Width of the operating band. Each side takes the first finite of warning, critical and
    /// physical limit, so a channel limited on one side still gets a span sized to its domain.
    pub fn operating_span(&self, bounds: &Bounds) -> Option<f64> {
        let low = [self.warning_low, self.critical_low, bounds.min]
            .into_iter()
            .find(|v| v.is_finite())?;
        let high = [self.warning_high, self.critical_high, bounds.max]
            .into_iter()
            .find(|v| v.is_finite())?;
        let span = high - low;
        (span.is_finite() && span >= 0.0).then_some(span)
    }
}

/// Physical bounds a reading must fall within to be stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

impl Bounds {
    /// Finite and within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// A registered, validated channel. Immutable once in the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    pub unit: String,
    pub thresholds: Thresholds,
    pub bounds: Bounds,
    pub capacity: usize,
    /// Effective trend epsilon (units per second).
    pub trend_epsilon: f64,
}

impl Channel {
    /// Validate a config entry. `default_capacity` and `epsilon_fraction` come from the feed.
    pub fn from_config(
        config: &ChannelConfig,
        default_capacity: usize,
        epsilon_fraction: f64,
    ) -> Result<Self, FeedError> {
        let invalid = |reason: &str| FeedError::InvalidChannel {
            channel: config.id.clone(),
            reason: reason.to_string(),
        };

        if config.id.trim().is_empty() {
            return Err(invalid("id must be non-empty"));
        }
        let thresholds = config.thresholds();
        let limits = [
            thresholds.critical_low,
            thresholds.warning_low,
            thresholds.warning_high,
            thresholds.critical_high,
        ];
        if limits.iter().any(|v| v.is_nan()) {
            return Err(invalid("thresholds must not be NaN"));
        }
        if !thresholds.is_ordered() {
            return Err(FeedError::InvalidThresholdOrder {
                channel: config.id.clone(),
            });
        }
        let bounds = config.bounds();
        if bounds.min.is_nan() || bounds.max.is_nan() || bounds.min > bounds.max {
            return Err(invalid("physical bounds must satisfy min <= max"));
        }
        let capacity = config.capacity.unwrap_or(default_capacity);
        if capacity == 0 {
            return Err(invalid("capacity must be > 0"));
        }
        let trend_epsilon = match config.trend_epsilon {
            Some(eps) if eps.is_finite() && eps >= 0.0 => eps,
            Some(_) => return Err(invalid("trend_epsilon must be finite and >= 0")),
            None => thresholds
                .operating_span(&bounds)
                .map(|span| span * epsilon_fraction)
                .unwrap_or(0.0),
        };

        Ok(Self {
            id: config.id.clone(),
            unit: config.unit.clone(),
            thresholds,
            bounds,
            capacity,
            trend_epsilon,
        })
    }
}

/// Channel description served to the dashboard. Unbounded limits are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: String,
    pub unit: String,
    pub warning_low: Option<f64>,
    pub warning_high: Option<f64>,
    pub critical_low: Option<f64>,
    pub critical_high: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub capacity: usize,
    pub trend_epsilon: f64,
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl From<&Channel> for ChannelInfo {
    fn from(c: &Channel) -> Self {
        Self {
            id: c.id.clone(),
            unit: c.unit.clone(),
            warning_low: finite(c.thresholds.warning_low),
            warning_high: finite(c.thresholds.warning_high),
            critical_low: finite(c.thresholds.critical_low),
            critical_high: finite(c.thresholds.critical_high),
            min: finite(c.bounds.min),
            max: finite(c.bounds.max),
            capacity: c.capacity,
            trend_epsilon: c.trend_epsilon,
        }
    }
}
