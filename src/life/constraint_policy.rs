use crate::core::phase::wrap_0_tau;
use crate::life::state::MusicalState;

#[derive(Clone, Copy, Debug)]
pub struct ConstraintPolicy {
    pub energy_capacity: f64,
    pub tension_threshold: f64,
    pub max_pitch: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstraintTelemetry {
    pub energy_clamped: bool,
    pub tension_before: f64,
    pub tension_resolved: bool,
    pub pitch_clamped: bool,
}

impl ConstraintTelemetry {
    pub fn any(&self) -> bool {
        self.energy_clamped || self.tension_resolved || self.pitch_clamped
    }
}

/// Clamp into `[lo, hi]`, sending NaN to `lo`.
#[inline]
fn clamp_or_floor(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() { lo } else { x.clamp(lo, hi) }
}

impl ConstraintPolicy {
    /// Post-integration correction, applied in this order:
    ///
    /// 1. energy clamped to `[0, energy_capacity]`
    /// 2. tension above threshold is halved once
    /// 3. pitch clamped to `[0, max_pitch]`, velocity untouched
    /// 4. phase wrapped into `[0, 2π)`
    ///
    /// NaN energy or pitch lands on 0 and infinities on the nearest bound;
    /// a non-finite phase becomes 0.
    pub fn apply(&self, state: MusicalState) -> (MusicalState, ConstraintTelemetry) {
        let mut next = state;
        let mut telemetry = ConstraintTelemetry {
            tension_before: state.tension,
            ..ConstraintTelemetry::default()
        };

        next.energy = clamp_or_floor(state.energy, 0.0, self.energy_capacity);
        telemetry.energy_clamped = next.energy != state.energy;

        // A single resolution event; a large overshoot may stay above threshold.
        if state.tension > self.tension_threshold {
            next.tension = state.tension * 0.5;
            telemetry.tension_resolved = true;
        }

        next.pitch = clamp_or_floor(state.pitch, 0.0, self.max_pitch);
        telemetry.pitch_clamped = next.pitch != state.pitch;

        next.phase = wrap_0_tau(state.phase);

        (next, telemetry)
    }
}
