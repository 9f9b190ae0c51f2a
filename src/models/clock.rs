// Mission clock reading (timer panel)

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockReading {
    pub elapsed_ms: u64,
    pub running: bool,
    /// `HH:MM:SS`; hours keep counting past 99.
    pub formatted: String,
    /// Elapsed fraction of the planned mission duration, capped at 1.0.
    pub progress: f64,
}

impl ClockReading {
    pub fn new(elapsed: Duration, running: bool, mission_duration: Duration) -> Self {
        let progress = if mission_duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / mission_duration.as_secs_f64()).min(1.0)
        };
        Self {
            elapsed_ms: elapsed.as_millis() as u64,
            running,
            formatted: format_hms(elapsed),
            progress,
        }
    }
}

/// Whole seconds as zero-padded `HH:MM:SS`.
pub fn format_hms(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
