//! Simulation configuration.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Settings for a simulation run. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Habitat width in world units.
    pub width: f64,
    /// Habitat height in world units.
    pub height: f64,
    /// Fixed timestep in seconds (e.g., 1/60 = 0.0167 for 60 Hz).
    pub fixed_timestep: f64,
    /// Seed for the random source; entropy when absent.
    pub seed: Option<u64>,
    /// Cell size of the proximity grid.
    pub spatial_cell_size: f64,
    /// Feed appears with probability `1 / feed_spawn_one_in` each tick.
    /// Zero turns spawning off.
    pub feed_spawn_one_in: u32,
    /// Incoming meteor odds per tick; `None` turns meteors off.
    pub meteor_spawn_one_in: Option<u32>,
    /// Repellants placed at setup.
    pub initial_repellants: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            fixed_timestep: 1.0 / 60.0, // 60 Hz
            seed: None,
            spatial_cell_size: 100.0,
            feed_spawn_one_in: 300,
            meteor_spawn_one_in: Some(900),
            initial_repellants: 3,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(SimError::InvalidHabitat {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.fixed_timestep > 0.0) {
            return Err(SimError::Config(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if !(self.spatial_cell_size > 0.0) {
            return Err(SimError::Config(format!(
                "spatial_cell_size must be positive, got {}",
                self.spatial_cell_size
            )));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
