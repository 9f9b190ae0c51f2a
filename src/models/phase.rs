// Mission phase models: the fixed flight sequence and how each step reads at a given moment

use serde::{Deserialize, Serialize};

/// Flight phases in mission order; serializes to kebab-case (e.g. "pre-launch").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissionPhase {
    #[default]
    PreLaunch,
    Launch,
    Ascent,
    Peak,
    Descent,
    Recovery,
}

impl MissionPhase {
    pub const ALL: [MissionPhase; 6] = [
        MissionPhase::PreLaunch,
        MissionPhase::Launch,
        MissionPhase::Ascent,
        MissionPhase::Peak,
        MissionPhase::Descent,
        MissionPhase::Recovery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionPhase::PreLaunch => "pre-launch",
            MissionPhase::Launch => "launch",
            MissionPhase::Ascent => "ascent",
            MissionPhase::Peak => "peak",
            MissionPhase::Descent => "descent",
            MissionPhase::Recovery => "recovery",
        }
    }

    /// Position in the sequence, 0-based.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Following phase; `None` once in recovery.
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

/// Where a phase stands relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseState {
    Complete,
    Active,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStep {
    pub phase: MissionPhase,
    pub state: PhaseState,
}

/// Current phase plus the full step list, as the phase tracker panel shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReading {
    pub current: MissionPhase,
    pub steps: Vec<PhaseStep>,
}

impl PhaseReading {
    pub fn new(current: MissionPhase) -> Self {
        let steps = MissionPhase::ALL
            .into_iter()
            .map(|phase| PhaseStep {
                phase,
                state: match phase.index().cmp(&current.index()) {
                    std::cmp::Ordering::Less => PhaseState::Complete,
                    std::cmp::Ordering::Equal => PhaseState::Active,
                    std::cmp::Ordering::Greater => PhaseState::Pending,
                },
            })
            .collect();
        Self { current, steps }
    }
}
