//! Tabular action values over a discretized state.
//!
//! States are quantized into four bucket indices that are folded into a
//! single 64-bit [`StateKey`]. The fold is a plain combining hash, so two
//! different bucket tuples may land on the same key and share a value
//! entry; the table is keyed on whatever the caller supplies.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;
use tracing::trace;

use crate::life::error::AgentError;
use crate::life::state::MusicalState;

/// Caller-defined action identifier.
pub type ActionId = i64;

/// Discretized state used to index the value table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey(pub u64);

const COMBINE_SEED: u64 = 0x243F_6A88_85A3_08D3;
const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// Fold bucket indices into one key.
pub fn combine_buckets(buckets: [i64; 4]) -> StateKey {
    let mut h = COMBINE_SEED;
    for b in buckets {
        h ^= (b as u64)
            .wrapping_add(GOLDEN)
            .wrapping_add(h << 6)
            .wrapping_add(h >> 2);
    }
    StateKey(h)
}

#[derive(Clone, Copy, Debug)]
pub struct Discretizer {
    pub total_notes: usize,
    pub energy_capacity: f64,
    pub tension_threshold: f64,
}

impl Discretizer {
    /// `[pitch, energy, tension, phase]` bucket indices.
    pub fn buckets(&self, state: &MusicalState) -> [i64; 4] {
        let pitch = (state.pitch.floor() as i64).rem_euclid(self.total_notes as i64);
        let energy = (state.energy / self.energy_capacity * 10.0).floor() as i64;
        let tension = (state.tension / self.tension_threshold * 10.0).floor() as i64;
        let phase = (state.phase / TAU * 8.0).floor() as i64;
        [pitch, energy, tension, phase]
    }

    pub fn discretize(&self, state: &MusicalState) -> StateKey {
        combine_buckets(self.buckets(state))
    }
}

/// Numerically stable softmax.
///
/// Non-finite inputs are handled as limits: `+inf` entries split the whole
/// mass evenly, `-inf` and NaN entries get zero weight. Fails when no input
/// is finite.
pub fn softmax(values: &[f64]) -> Result<Vec<f64>, AgentError> {
    if values.iter().all(|v| !v.is_finite()) {
        return Err(AgentError::numerical_instability(format!(
            "softmax over {} values with no finite entry",
            values.len()
        )));
    }

    let n_pos_inf = values
        .iter()
        .filter(|v| v.is_infinite() && v.is_sign_positive())
        .count();
    if n_pos_inf > 0 {
        let p = 1.0 / n_pos_inf as f64;
        return Ok(values
            .iter()
            .map(|v| if *v == f64::INFINITY { p } else { 0.0 })
            .collect());
    }

    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() { (v - max).exp() } else { 0.0 })
        .collect();
    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Err(AgentError::numerical_instability(format!(
            "softmax weights sum to {sum}"
        )));
    }
    Ok(weights.into_iter().map(|w| w / sum).collect())
}

/// Lazily populated `(state, action) -> value` table with no eviction.
#[derive(Clone, Debug, Default)]
pub struct ValueMemory {
    table: HashMap<(StateKey, ActionId), f64>,
}

impl ValueMemory {
    pub fn value(&self, key: StateKey, action: ActionId) -> f64 {
        self.table.get(&(key, action)).copied().unwrap_or(0.0)
    }

    /// TD(0) update `v += lr * (reward - v)`; returns the stored value.
    pub fn update(&mut self, key: StateKey, action: ActionId, reward: f64, lr: f64) -> f64 {
        let v = self.table.entry((key, action)).or_insert(0.0);
        *v += lr * (reward - *v);
        *v
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct LearningPolicy {
    pub discretizer: Discretizer,
    pub learning_rate: f64,
    memory: ValueMemory,
}

impl LearningPolicy {
    pub fn new(discretizer: Discretizer, learning_rate: f64) -> Self {
        Self {
            discretizer,
            learning_rate,
            memory: ValueMemory::default(),
        }
    }

    pub fn memory(&self) -> &ValueMemory {
        &self.memory
    }

    pub fn discretize(&self, state: &MusicalState) -> StateKey {
        self.discretizer.discretize(state)
    }

    /// Selection distribution over `candidates` in `state`.
    pub fn action_probabilities(
        &self,
        state: &MusicalState,
        candidates: &[ActionId],
    ) -> Result<Vec<f64>, AgentError> {
        if candidates.is_empty() {
            return Err(AgentError::invalid_argument(
                "choose_action requires at least one candidate",
            ));
        }
        let key = self.discretize(state);
        let values: Vec<f64> = candidates
            .iter()
            .map(|&a| self.memory.value(key, a))
            .collect();
        softmax(&values)
    }

    /// Sample one candidate from [`Self::action_probabilities`].
    ///
    /// Candidates valued at `+inf` deliberately take all the mass, so the
    /// pick among them is deterministic up to ties.
    pub fn choose_action<R: Rng + ?Sized>(
        &self,
        state: &MusicalState,
        candidates: &[ActionId],
        rng: &mut R,
    ) -> Result<ActionId, AgentError> {
        let probs = self.action_probabilities(state, candidates)?;
        let dist = WeightedIndex::new(&probs)
            .map_err(|e| AgentError::numerical_instability(format!("sampling weights: {e}")))?;
        let action = candidates[dist.sample(rng)];
        trace!(target: "agent::learn", ?candidates, ?probs, action, "choose_action");
        Ok(action)
    }

    /// The key is taken as given; it need not come from [`Self::discretize`].
    pub fn update_memory(&mut self, key: StateKey, action: ActionId, reward: f64) -> f64 {
        let value = self.memory.update(key, action, reward, self.learning_rate);
        trace!(target: "agent::learn", key = key.0, action, reward, value, "update_memory");
        value
    }
}
