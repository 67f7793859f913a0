//! Public API for the simulation.
//!
//! `Simulation` owns the habitat, the factory registry, the random source and
//! the running scenario. A front-end calls `setup` once and then either
//! `step` per tick or `advance` with wall-clock time.
//!
//! ## Fixed Timestep
//!
//! `advance(dt)` accumulates time and runs as many fixed ticks as fit, so the
//! outcome depends only on the seed and the number of ticks, never on frame
//! rate.

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::geometry::Position;
use crate::habitat::{Habitat, TickReport};
use crate::random::{RandomSource, SeededRandom};
use crate::registry::ObjectRegistry;
use crate::render::DrawContext;
use crate::scenario::{self, DefaultScenario, Scenario, ScenarioContext};
use crate::snapshot::Snapshot;
use bevy_ecs::prelude::Entity;
use tracing::{debug, info, warn};

/// The main simulation container.
pub struct Simulation {
    habitat: Habitat,
    registry: ObjectRegistry,
    rng: Box<dyn RandomSource>,
    scenario: Box<dyn Scenario>,
    config: SimConfig,
    tick: u64,
    time: f64,
    /// Accumulated time for fixed timestep.
    time_accumulator: f64,
    is_setup: bool,
}

impl Simulation {
    /// Simulation seeded from `config.seed`, or from entropy when unset.
    pub fn new(config: SimConfig, scenario: Box<dyn Scenario>) -> Result<Self> {
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };
        Self::with_random(config, scenario, rng)
    }

    /// Simulation drawing from an explicit random source.
    pub fn with_random(
        config: SimConfig,
        scenario: Box<dyn Scenario>,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;
        let habitat = Habitat::with_cell_size(config.width, config.height, config.spatial_cell_size)?;
        Ok(Self {
            habitat,
            registry: ObjectRegistry::new(),
            rng,
            scenario,
            config,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
            is_setup: false,
        })
    }

    /// Default scenario with default config.
    pub fn with_defaults() -> Result<Self> {
        Self::new(SimConfig::default(), Box::new(DefaultScenario))
    }

    /// Let the scenario populate the habitat. Later calls do nothing.
    pub fn setup(&mut self) -> Result<()> {
        if self.is_setup {
            warn!("setup called twice; ignoring");
            return Ok(());
        }
        let mut ctx = ScenarioContext {
            habitat: &mut self.habitat,
            registry: &mut self.registry,
            rng: self.rng.as_mut(),
            config: &self.config,
        };
        self.scenario.setup(&mut ctx)?;
        self.is_setup = true;
        info!(
            width = self.config.width,
            height = self.config.height,
            objects = self.habitat.len(),
            "simulation set up"
        );
        Ok(())
    }

    /// Run one tick: scenario spawns, the habitat sweep, then the draw pass.
    pub fn step(&mut self, ctx: &mut dyn DrawContext) -> Result<TickReport> {
        let mut scenario_ctx = ScenarioContext {
            habitat: &mut self.habitat,
            registry: &mut self.registry,
            rng: self.rng.as_mut(),
            config: &self.config,
        };
        self.scenario.step(&mut scenario_ctx)?;

        let mut report = self.habitat.tick(self.rng.as_mut());
        self.tick += 1;
        self.time += self.config.fixed_timestep;
        report.tick = self.tick;
        report.drawn = self.habitat.draw(ctx);
        Ok(report)
    }

    /// Step forward by `dt` seconds of wall time. Returns the ticks run.
    ///
    /// Negative `dt` counts as zero. A non-finite `dt` is rejected and leaves
    /// the clock untouched.
    pub fn advance(&mut self, dt: f64, ctx: &mut dyn DrawContext) -> Result<u32> {
        if !dt.is_finite() {
            return Err(SimError::InvalidTimestep(dt));
        }
        let fixed_dt = self.config.fixed_timestep;
        self.time_accumulator += dt.max(0.0);

        let mut ticks = 0;
        while self.time_accumulator >= fixed_dt {
            self.step(ctx)?;
            self.time_accumulator -= fixed_dt;
            ticks += 1;
        }
        if ticks > 0 {
            debug!(ticks, tick = self.tick, "advanced");
        }
        Ok(ticks)
    }

    /// Place an object built by a registered factory.
    ///
    /// Returns the new entity, or `None` when called while a sweep is running.
    pub fn spawn_registered(&mut self, name: &str, pos: Position) -> Result<Option<Entity>> {
        let object = self
            .registry
            .create(name, pos, &self.habitat, self.rng.as_mut())?;
        info!(%name, x = pos.x, y = pos.y, "placed object");
        Ok(self.habitat.add_object(object))
    }

    /// Uniform random point inside the habitat.
    pub fn random_position(&mut self) -> Position {
        scenario::random_position(&self.habitat, self.rng.as_mut())
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_habitat(&self.habitat, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(self.snapshot().to_json()?)
    }

    pub fn habitat(&self) -> &Habitat {
        &self.habitat
    }

    pub fn habitat_mut(&mut self) -> &mut Habitat {
        &mut self.habitat
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f64 {
        self.time
    }
}
