//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("width must be larger than 0: {0}")]
    InvalidWidth(f64),

    #[error("height must be larger than 0: {0}")]
    InvalidHeight(f64),

    #[error("habitat must have a positive size, got {width}x{height}")]
    InvalidHabitat { width: f64, height: f64 },

    #[error("no object factory registered as {0:?}")]
    UnknownFactory(String),

    #[error("time step must be finite, got {0}")]
    InvalidTimestep(f64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
