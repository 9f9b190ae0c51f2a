// Mission phase tracker: operator-driven position in the flight sequence.
// Held apart from the mission clock; pausing or resetting the clock leaves the phase alone.

use parking_lot::Mutex;

use crate::models::{MissionPhase, PhaseReading};

#[derive(Debug, Default)]
pub struct MissionPhaseTracker {
    current: Mutex<MissionPhase>,
}

impl MissionPhaseTracker {
    pub fn new(initial: MissionPhase) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    pub fn current(&self) -> MissionPhase {
        *self.current.lock()
    }

    /// Jump to `phase`, forwards or back. Returns the phase it replaced.
    pub fn set(&self, phase: MissionPhase) -> MissionPhase {
        std::mem::replace(&mut *self.current.lock(), phase)
    }

    /// Step to the next phase. `None` (and no change) once in recovery.
    pub fn advance(&self) -> Option<MissionPhase> {
        let mut current = self.current.lock();
        let next = current.next()?;
        *current = next;
        Some(next)
    }

    pub fn reading(&self) -> PhaseReading {
        PhaseReading::new(self.current())
    }
}
