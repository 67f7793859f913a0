//! Habitat - Simulation Core
//!
//! A deterministic, single-threaded 2D simulation of creatures, meteors and
//! collectibles sharing a bounded habitat.
//! Uses `bevy_ecs` for entity storage and per-tick upkeep systems.

pub mod components;
pub mod config;
pub mod error;
pub mod geometry;
pub mod habitat;
pub mod random;
pub mod registry;
pub mod render;
pub mod scenario;
pub mod simulation;
pub mod snapshot;
pub mod spatial;
pub mod systems;

pub use components::*;
pub use config::SimConfig;
pub use error::{Result, SimError};
pub use geometry::{Direction, Position};
pub use habitat::{Habitat, ObjectView, TickReport};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use registry::ObjectRegistry;
pub use render::{Color, DrawContext, Icon, NullCanvas, RecordingCanvas};
pub use scenario::{DefaultScenario, EmptyScenario, Scenario, ScenarioContext};
pub use simulation::Simulation;
pub use snapshot::{ObjectSnapshot, Snapshot};
pub use spatial::{SpatialEntry, SpatialGrid};
