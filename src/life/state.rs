use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::linalg::Vec4;

/// Complete musical state of one agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MusicalState {
    pub pitch: f64,
    pub time: f64,
    pub energy: f64,
    pub tension: f64,
    pub velocity: f64,
    pub phase: f64,
}

impl MusicalState {
    /// Resting state at full energy.
    pub fn at_rest(energy: f64) -> Self {
        Self {
            energy,
            ..Self::default()
        }
    }

    /// The `[pitch, time, energy, tension]` vector fields act on.
    pub fn field_vector(&self) -> Vec4 {
        Vec4::new(self.pitch, self.time, self.energy, self.tension)
    }

    pub fn summary(&self) -> StateSummary {
        StateSummary { state: *self }
    }
}

/// Read-only snapshot of the current state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StateSummary {
    state: MusicalState,
}

impl StateSummary {
    pub fn state(&self) -> &MusicalState {
        &self.state
    }

    /// The six state fields keyed by name.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        let s = &self.state;
        BTreeMap::from([
            ("pitch", s.pitch),
            ("time", s.time),
            ("energy", s.energy),
            ("tension", s.tension),
            ("velocity", s.velocity),
            ("phase", s.phase),
        ])
    }
}
