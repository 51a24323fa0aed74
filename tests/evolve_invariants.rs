use std::f64::consts::TAU;

use approx::assert_abs_diff_eq;
use melodic_agent::core::linalg::Mat4;
use melodic_agent::{AgentConfig, FieldTensor, FieldType, MelodicAgent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn one_octave_agent() -> MelodicAgent {
    MelodicAgent::new(AgentConfig {
        num_octaves: 1,
        energy_capacity: 10.0,
        tension_threshold: 1.0,
        learning_rate: 0.1,
        seed: 0,
    })
    .expect("valid config")
}

fn tensor(m: Mat4) -> FieldTensor {
    FieldTensor::new(m).expect("finite tensor")
}

fn random_tensor(rng: &mut StdRng, scale: f64) -> FieldTensor {
    tensor(Mat4::from_fn(|_, _| rng.random_range(-scale..scale)))
}

#[test]
fn bounds_hold_after_every_step_under_random_fields() {
    let mut rng = StdRng::seed_from_u64(2024);
    for trial in 0..20 {
        let mut agent = one_octave_agent();
        for ty in FieldType::ALL {
            if rng.random_bool(0.7) {
                agent.register_field(ty, random_tensor(&mut rng, 0.5));
            }
        }
        let dt = rng.random_range(0.01..0.2);
        for step in 0..200 {
            agent.evolve(dt).expect("positive dt");
            let s = agent.state();
            assert!(
                (0.0..=10.0).contains(&s.energy),
                "trial {trial} step {step}: energy {}",
                s.energy
            );
            assert!(
                (0.0..=11.0).contains(&s.pitch),
                "trial {trial} step {step}: pitch {}",
                s.pitch
            );
            assert!(
                (0.0..TAU).contains(&s.phase),
                "trial {trial} step {step}: phase {}",
                s.phase
            );
        }
        assert_eq!(agent.trajectory().len(), 200);
    }
}

#[test]
fn bounds_hold_after_tension_overflows() {
    let mut agent = one_octave_agent();
    // Tension feeds itself faster than the single halving removes it, and
    // drives phase, so both run off to infinity within a few hundred steps.
    let mut m = Mat4::zeros();
    m[(3, 2)] = 1.0;
    m[(3, 3)] = 10.0;
    m[(1, 3)] = 1.0;
    agent.register_field(FieldType::Harmonic, tensor(m));
    for step in 0..600 {
        agent.evolve(1.0).expect("positive dt");
        let s = agent.state();
        assert!((0.0..=10.0).contains(&s.energy), "step {step}: energy {}", s.energy);
        assert!((0.0..=11.0).contains(&s.pitch), "step {step}: pitch {}", s.pitch);
        assert!((0.0..TAU).contains(&s.phase), "step {step}: phase {}", s.phase);
    }
    assert!(!agent.state().tension.is_finite());
}

#[test]
fn non_finite_rows_are_rejected_at_registration() {
    let mut agent = one_octave_agent();
    let mut rows = [[0.0; 4]; 4];
    rows[2][2] = f64::NAN;
    assert!(agent.register_field_rows(FieldType::Harmonic, &rows).is_err());
    assert!(!agent.fields().is_registered(FieldType::Harmonic));
}

#[test]
fn no_fields_means_no_energy_consumption() {
    let mut agent = one_octave_agent();
    for _ in 0..10 {
        agent.evolve(1.0).unwrap();
    }
    let s = agent.state();
    assert_eq!(s.energy, 10.0);
    assert_eq!(s.pitch, 0.0);
    assert_eq!(s.velocity, 0.0);
    assert_abs_diff_eq!(s.time, 10.0, epsilon = 1e-12);
}

#[test]
fn energy_force_of_five_halves_energy() {
    let mut agent = one_octave_agent();
    // Initial field vector is [0, 0, 10, 0]; Harmonic weight is 1.0.
    let mut m = Mat4::zeros();
    m[(2, 2)] = 0.5;
    agent.register_field(FieldType::Harmonic, tensor(m));
    let force = agent.compute_force(agent.state());
    assert_abs_diff_eq!(force[2], 5.0, epsilon = 1e-12);

    agent.evolve(1.0).unwrap();
    assert_abs_diff_eq!(agent.state().energy, 5.0, epsilon = 1e-12);
}

#[test]
fn energy_never_goes_negative() {
    let mut agent = one_octave_agent();
    let mut m = Mat4::zeros();
    m[(2, 2)] = 4.0;
    agent.register_field(FieldType::Harmonic, tensor(m));
    agent.evolve(1.0).unwrap();
    assert_eq!(agent.state().energy, 0.0);
}

#[test]
fn pitch_sticks_to_top_without_velocity_reset() {
    let mut agent = one_octave_agent();
    // Constant upward push: force[0] = energy.
    let mut m = Mat4::zeros();
    m[(0, 2)] = 1.0;
    agent.register_field(FieldType::Harmonic, tensor(m));
    for _ in 0..10 {
        agent.evolve(1.0).unwrap();
    }
    assert_eq!(agent.state().pitch, 11.0);
    assert!(agent.state().velocity > 0.0);
}

#[test]
fn tension_resolution_halves_exactly_once() {
    let mut agent = one_octave_agent();
    // force[3] = energy * 0.7 * k; choose k so the first step reaches 6.0.
    let mut m = Mat4::zeros();
    m[(3, 2)] = 6.0 / (10.0 * 0.7);
    agent.register_field(FieldType::Tension, tensor(m));

    agent.evolve(1.0).unwrap();
    let after = agent.state().tension;
    assert_abs_diff_eq!(after, 3.0, epsilon = 1e-9);
    // Still above the threshold: the single halving is not repeated.
    assert!(after > agent.config().tension_threshold);
}

#[test]
fn tension_below_threshold_is_untouched() {
    let mut agent = one_octave_agent();
    let mut m = Mat4::zeros();
    m[(3, 2)] = 0.05 / 7.0;
    agent.register_field(FieldType::Tension, tensor(m));
    agent.evolve(1.0).unwrap();
    assert_abs_diff_eq!(agent.state().tension, 0.05, epsilon = 1e-12);
}

#[test]
fn history_holds_pre_step_states_in_order() {
    let mut agent = one_octave_agent();
    let mut m = Mat4::zeros();
    m[(0, 2)] = 0.01;
    agent.register_field(FieldType::Rhythmic, tensor(m));
    let mut seen = vec![*agent.state()];
    for _ in 0..5 {
        agent.evolve(0.25).unwrap();
        seen.push(*agent.state());
    }
    seen.pop();
    assert_eq!(agent.trajectory().states(), seen.as_slice());
}

#[test]
fn failed_evolve_keeps_agent_usable() {
    let mut agent = one_octave_agent();
    assert!(agent.evolve(-0.1).is_err());
    agent.evolve(0.1).unwrap();
    assert_eq!(agent.trajectory().len(), 1);
}
