use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::phase::phase_coherence;
use crate::life::state::MusicalState;

/// Append-only record of pre-step states.
#[derive(Clone, Debug, Default)]
pub struct Trajectory {
    states: Vec<MusicalState>,
}

impl Trajectory {
    pub fn push(&mut self, state: MusicalState) {
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[MusicalState] {
        &self.states
    }

    pub fn last(&self) -> Option<&MusicalState> {
        self.states.last()
    }

    pub fn summarize(&self) -> Option<TrajectoryStats> {
        summarize(&self.states)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrajectoryStats {
    pub avg_pitch: f64,
    pub pitch_variance: f64,
    pub energy_usage: f64,
    pub avg_tension: f64,
    pub phase_coherence: f64,
}

impl TrajectoryStats {
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("avg_pitch", self.avg_pitch),
            ("pitch_variance", self.pitch_variance),
            ("energy_usage", self.energy_usage),
            ("avg_tension", self.avg_tension),
            ("phase_coherence", self.phase_coherence),
        ])
    }
}

/// Aggregate statistics over a history; `None` when it is empty.
///
/// `pitch_variance` is the population variance. `energy_usage` is the mean
/// energy level over the history.
pub fn summarize(history: &[MusicalState]) -> Option<TrajectoryStats> {
    if history.is_empty() {
        return None;
    }
    let n = history.len() as f64;
    let mean = |f: fn(&MusicalState) -> f64| history.iter().map(f).sum::<f64>() / n;

    let avg_pitch = mean(|s| s.pitch);
    let pitch_variance = history
        .iter()
        .map(|s| (s.pitch - avg_pitch).powi(2))
        .sum::<f64>()
        / n;

    Some(TrajectoryStats {
        avg_pitch,
        pitch_variance,
        energy_usage: mean(|s| s.energy),
        avg_tension: mean(|s| s.tension),
        phase_coherence: phase_coherence(history.iter().map(|s| s.phase)),
    })
}
