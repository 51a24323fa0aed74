use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::config::AgentConfig;
use crate::core::linalg::Vec4;
use crate::life::constraint_policy::ConstraintPolicy;
use crate::life::error::AgentError;
use crate::life::field::{FieldForceModel, FieldTensor, FieldType};
use crate::life::integrator;
use crate::life::learning::{ActionId, Discretizer, LearningPolicy, StateKey, ValueMemory};
use crate::life::state::{MusicalState, StateSummary};
use crate::life::trajectory::{Trajectory, TrajectoryStats};

/// A single melodic agent driven by registered fields.
///
/// Each [`evolve`](Self::evolve) computes the field force on the current
/// state, integrates one semi-implicit Euler step, applies the constraint
/// policy and records the previous state in the trajectory. Action
/// selection and value updates work against the same state independently.
#[derive(Debug)]
pub struct MelodicAgent {
    config: AgentConfig,
    state: MusicalState,
    trajectory: Trajectory,
    fields: FieldForceModel,
    constraints: ConstraintPolicy,
    learning: LearningPolicy,
    rng: SmallRng,
}

impl MelodicAgent {
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        debug!(
            target: "agent::spawn",
            num_octaves = config.num_octaves,
            energy_capacity = config.energy_capacity,
            tension_threshold = config.tension_threshold,
            learning_rate = config.learning_rate,
            seed = config.seed
        );
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: AgentConfig) -> Self {
        let constraints = ConstraintPolicy {
            energy_capacity: config.energy_capacity,
            tension_threshold: config.tension_threshold,
            max_pitch: config.max_pitch(),
        };
        let discretizer = Discretizer {
            total_notes: config.total_notes(),
            energy_capacity: config.energy_capacity,
            tension_threshold: config.tension_threshold,
        };
        Self {
            state: MusicalState::at_rest(config.energy_capacity),
            trajectory: Trajectory::default(),
            fields: FieldForceModel::new(),
            constraints,
            learning: LearningPolicy::new(discretizer, config.learning_rate),
            rng: SmallRng::seed_from_u64(config.seed),
            config,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn state(&self) -> &MusicalState {
        &self.state
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn fields(&self) -> &FieldForceModel {
        &self.fields
    }

    pub fn memory(&self) -> &ValueMemory {
        self.learning.memory()
    }

    pub fn register_field(&mut self, field_type: FieldType, tensor: FieldTensor) {
        let replaced = self.fields.register(field_type, tensor).is_some();
        debug!(target: "agent::field", ?field_type, replaced, "register_field");
    }

    /// Register a field from row-major rows; rejects anything but 4x4.
    pub fn register_field_rows<R: AsRef<[f64]>>(
        &mut self,
        field_type: FieldType,
        rows: &[R],
    ) -> Result<(), AgentError> {
        let tensor = FieldTensor::from_rows(rows)?;
        self.register_field(field_type, tensor);
        Ok(())
    }

    pub fn unregister_field(&mut self, field_type: FieldType) -> Option<FieldTensor> {
        self.fields.unregister(field_type)
    }

    pub fn compute_force(&self, state: &MusicalState) -> Vec4 {
        self.fields.compute_force(state)
    }

    /// Advance the agent by `dt` seconds.
    pub fn evolve(&mut self, dt: f64) -> Result<(), AgentError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(AgentError::invalid_argument(format!(
                "evolve requires a positive finite dt, got {dt}"
            )));
        }

        let force = self.fields.compute_force(&self.state);
        let integrated = integrator::step(&self.state, &force, dt);
        let (next, telemetry) = self.constraints.apply(integrated);

        if telemetry.any() {
            debug!(
                target: "agent::constraint",
                time = next.time,
                energy_clamped = telemetry.energy_clamped,
                tension_resolved = telemetry.tension_resolved,
                tension_before = telemetry.tension_before,
                tension_after = next.tension,
                pitch_clamped = telemetry.pitch_clamped
            );
        }
        trace!(
            target: "agent::evolve",
            dt,
            force = ?force.as_slice(),
            pitch = next.pitch,
            energy = next.energy,
            tension = next.tension,
            phase = next.phase
        );

        self.trajectory.push(self.state);
        self.state = next;
        Ok(())
    }

    /// Discretized key of the current state.
    pub fn current_state_key(&self) -> StateKey {
        self.learning.discretize(&self.state)
    }

    pub fn discretize(&self, state: &MusicalState) -> StateKey {
        self.learning.discretize(state)
    }

    pub fn action_probabilities(&self, candidates: &[ActionId]) -> Result<Vec<f64>, AgentError> {
        self.learning.action_probabilities(&self.state, candidates)
    }

    /// Sample an action using the agent's own seeded RNG.
    ///
    /// Actions valued at `+inf` deliberately absorb all selection mass.
    pub fn choose_action(&mut self, candidates: &[ActionId]) -> Result<ActionId, AgentError> {
        self.learning
            .choose_action(&self.state, candidates, &mut self.rng)
    }

    /// Sample an action using a caller-supplied random source.
    pub fn choose_action_with<R: Rng + ?Sized>(
        &self,
        candidates: &[ActionId],
        rng: &mut R,
    ) -> Result<ActionId, AgentError> {
        self.learning.choose_action(&self.state, candidates, rng)
    }

    /// TD(0) update of the value stored under `(state_key, action)`.
    ///
    /// `state_key` is not checked against [`Self::current_state_key`].
    pub fn update_memory(&mut self, state_key: StateKey, action: ActionId, reward: f64) -> f64 {
        self.learning.update_memory(state_key, action, reward)
    }

    pub fn memory_value(&self, state_key: StateKey, action: ActionId) -> f64 {
        self.learning.memory().value(state_key, action)
    }

    pub fn state_summary(&self) -> StateSummary {
        self.state.summary()
    }

    pub fn trajectory_stats(&self) -> Option<TrajectoryStats> {
        self.trajectory.summarize()
    }

    /// Aggregate trajectory statistics by name, empty before the first step.
    pub fn analyze_trajectory(&self) -> BTreeMap<&'static str, f64> {
        self.trajectory_stats()
            .map(|stats| stats.as_map())
            .unwrap_or_default()
    }
}

impl Default for MelodicAgent {
    fn default() -> Self {
        Self::from_valid_config(AgentConfig::default())
    }
}
