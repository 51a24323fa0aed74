//! Evolve one agent under a random harmonic field and print the analysis.
//!
//! Run:
//! - cargo run --example random_field
//! - RUST_LOG=agent=debug cargo run --example random_field -- agent.toml

use melodic_agent::core::linalg::Mat4;
use melodic_agent::{AppConfig, FieldTensor, FieldType, MelodicAgent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "agent.toml".to_string());
    let cfg = AppConfig::load_or_default(&config_path);

    let mut agent = MelodicAgent::new(cfg.agent.clone())?;
    let mut rng = StdRng::seed_from_u64(cfg.agent.seed);
    let harmonic = Mat4::from_fn(|_, _| rng.sample::<f64, _>(StandardNormal));
    agent.register_field(FieldType::Harmonic, FieldTensor::new(harmonic)?);

    for _ in 0..cfg.simulation.steps {
        agent.evolve(cfg.simulation.dt)?;
    }

    let analysis = agent.analyze_trajectory();
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
