use crate::core::linalg::Vec4;
use crate::life::state::MusicalState;

/// Semi-implicit (symplectic) Euler step.
///
/// Pitch advances with the velocity from *before* the step, while velocity,
/// phase, energy and tension take the new force. Energy only ever drains:
/// the consumption term is `dt * |force[2]|`.
///
/// The caller guarantees `dt > 0`.
pub fn step(state: &MusicalState, force: &Vec4, dt: f64) -> MusicalState {
    MusicalState {
        pitch: state.pitch + dt * state.velocity,
        velocity: state.velocity + dt * force[0],
        time: state.time + dt,
        energy: state.energy - dt * force[2].abs(),
        tension: state.tension + dt * force[3],
        phase: state.phase + dt * force[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_uses_previous_velocity() {
        let s = MusicalState {
            velocity: 2.0,
            ..MusicalState::at_rest(10.0)
        };
        let next = step(&s, &Vec4::new(4.0, 0.0, 0.0, 0.0), 0.5);
        assert_eq!(next.pitch, 1.0);
        assert_eq!(next.velocity, 4.0);
    }

    #[test]
    fn energy_consumption_ignores_force_sign() {
        let s = MusicalState::at_rest(10.0);
        let a = step(&s, &Vec4::new(0.0, 0.0, 3.0, 0.0), 1.0);
        let b = step(&s, &Vec4::new(0.0, 0.0, -3.0, 0.0), 1.0);
        assert_eq!(a.energy, 7.0);
        assert_eq!(b.energy, 7.0);
    }

    #[test]
    fn time_phase_and_tension_advance() {
        let s = MusicalState::at_rest(1.0);
        let next = step(&s, &Vec4::new(0.0, 1.5, 0.0, -0.25), 2.0);
        assert_eq!(next.time, 2.0);
        assert_eq!(next.phase, 3.0);
        assert_eq!(next.tension, -0.5);
    }
}
