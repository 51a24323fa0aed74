use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::life::error::AgentError;

pub const NOTES_PER_OCTAVE: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "AgentConfig::default_num_octaves")]
    pub num_octaves: usize,
    #[serde(default = "AgentConfig::default_energy_capacity")]
    pub energy_capacity: f64,
    #[serde(default = "AgentConfig::default_tension_threshold")]
    pub tension_threshold: f64,
    #[serde(default = "AgentConfig::default_learning_rate")]
    pub learning_rate: f64,
    /// Seed for the agent's own action-sampling RNG.
    #[serde(default)]
    pub seed: u64,
}

impl AgentConfig {
    fn default_num_octaves() -> usize {
        2
    }
    fn default_energy_capacity() -> f64 {
        100.0
    }
    fn default_tension_threshold() -> f64 {
        0.8
    }
    fn default_learning_rate() -> f64 {
        0.01
    }

    pub fn total_notes(&self) -> usize {
        NOTES_PER_OCTAVE * self.num_octaves
    }

    /// Highest reachable pitch index.
    pub fn max_pitch(&self) -> f64 {
        self.total_notes().saturating_sub(1) as f64
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        if self.num_octaves == 0 {
            return Err(AgentError::configuration("num_octaves must be at least 1"));
        }
        if !(self.energy_capacity.is_finite() && self.energy_capacity > 0.0) {
            return Err(AgentError::configuration(format!(
                "energy_capacity must be positive and finite, got {}",
                self.energy_capacity
            )));
        }
        if !(self.tension_threshold.is_finite() && self.tension_threshold > 0.0) {
            return Err(AgentError::configuration(format!(
                "tension_threshold must be positive and finite, got {}",
                self.tension_threshold
            )));
        }
        if !self.learning_rate.is_finite() {
            return Err(AgentError::configuration(format!(
                "learning_rate must be finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            num_octaves: Self::default_num_octaves(),
            energy_capacity: Self::default_energy_capacity(),
            tension_threshold: Self::default_tension_threshold(),
            learning_rate: Self::default_learning_rate(),
            seed: 0,
        }
    }
}

/// Parameters for a driving loop around the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_dt")]
    pub dt: f64,
    #[serde(default = "SimulationConfig::default_steps")]
    pub steps: usize,
}

impl SimulationConfig {
    fn default_dt() -> f64 {
        0.1
    }
    fn default_steps() -> usize {
        100
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: Self::default_dt(),
            steps: Self::default_steps(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl AppConfig {
    fn format_f64_compact(x: f64) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() { "0".to_string() } else { s }
    }

    /// Render `self` as TOML with every value commented out.
    fn commented_toml(&self) -> Option<String> {
        let text = toml::to_string_pretty(self).ok()?;
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
                continue;
            }
            let mut out_line = line.to_string();
            if let Some((lhs, rhs)) = line.split_once('=') {
                let rhs_trim = rhs.trim();
                if rhs_trim.contains('.')
                    && let Ok(val) = rhs_trim.parse::<f64>()
                {
                    let mut formatted = Self::format_f64_compact(val);
                    if !formatted.contains('.') {
                        formatted.push_str(".0");
                    }
                    out_line = format!("{} = {}", lhs.trim(), formatted);
                }
            }
            commented.push_str("# ");
            commented.push_str(&out_line);
            commented.push('\n');
        }
        Some(commented)
    }

    /// Read `path`, or write a commented defaults file there if it is missing.
    ///
    /// Unreadable or unparsable files fall back to defaults with a warning.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!(target: "config", "Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    warn!(target: "config", "Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        let default_cfg = Self::default();
        match default_cfg.commented_toml() {
            Some(text) => {
                if let Err(err) = fs::write(path_obj, text) {
                    warn!(target: "config", "Failed to write default config to {path}: {err}");
                }
            }
            None => {
                warn!(target: "config", "Failed to serialize default config; continuing with defaults");
            }
        }
        default_cfg
    }
}
