// Mission elapsed-time clock: start / pause / reset, independent of sample arrival.
// Every operation has an `_at` form taking the instant explicitly; the plain forms use now.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::models::ClockReading;

pub const DEFAULT_MISSION_DURATION: Duration = Duration::from_secs(3600);

#[derive(Debug, Default)]
struct ClockState {
    /// Start of the current running stretch; `None` while paused or reset.
    running_since: Option<Instant>,
    /// Time banked by earlier running stretches.
    accumulated: Duration,
}

impl ClockState {
    fn elapsed_at(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .running_since
                .map(|since| now.saturating_duration_since(since))
                .unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct MissionClock {
    state: Mutex<ClockState>,
    mission_duration: Duration,
}

impl Default for MissionClock {
    fn default() -> Self {
        Self::new(DEFAULT_MISSION_DURATION)
    }
}

impl MissionClock {
    /// A stopped clock at zero. `mission_duration` only scales `ClockReading::progress`.
    pub fn new(mission_duration: Duration) -> Self {
        Self {
            state: Mutex::new(ClockState::default()),
            mission_duration,
        }
    }

    pub fn start(&self) -> bool {
        self.start_at(Instant::now())
    }

    /// Start or resume. Returns false (no-op) if already running.
    pub fn start_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        if state.running_since.is_some() {
            return false;
        }
        state.running_since = Some(now);
        true
    }

    pub fn pause(&self) -> bool {
        self.pause_at(Instant::now())
    }

    /// Bank the running stretch and freeze. Returns false if not running.
    pub fn pause_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        match state.running_since.take() {
            Some(since) => {
                state.accumulated += now.saturating_duration_since(since);
                true
            }
            None => false,
        }
    }

    /// Zero and stop. Does not restart.
    pub fn reset(&self) {
        *self.state.lock() = ClockState::default();
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running_since.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.state.lock().elapsed_at(now)
    }

    pub fn reading(&self) -> ClockReading {
        self.reading_at(Instant::now())
    }

    pub fn reading_at(&self, now: Instant) -> ClockReading {
        let state = self.state.lock();
        ClockReading::new(
            state.elapsed_at(now),
            state.running_since.is_some(),
            self.mission_duration,
        )
    }
}
