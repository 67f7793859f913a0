//! Scenarios populate the habitat and inject objects while it runs.

use crate::components::SimObject;
use crate::config::SimConfig;
use crate::error::Result;
use crate::geometry::{Direction, Position};
use crate::habitat::Habitat;
use crate::random::RandomSource;
use crate::registry::ObjectRegistry;
use crate::render::{paint_feed, paint_repellant, Icon};
use tracing::{debug, info};

/// Everything a scenario may touch.
pub struct ScenarioContext<'a> {
    pub habitat: &'a mut Habitat,
    pub registry: &'a mut ObjectRegistry,
    pub rng: &'a mut dyn RandomSource,
    pub config: &'a SimConfig,
}

impl ScenarioContext<'_> {
    /// Uniform random point inside the habitat.
    pub fn random_position(&mut self) -> Position {
        random_position(&*self.habitat, &mut *self.rng)
    }
}

/// Uniform random point inside `habitat`.
pub fn random_position(habitat: &Habitat, rng: &mut dyn RandomSource) -> Position {
    Position::new(
        rng.next_unit() * habitat.width(),
        rng.next_unit() * habitat.height(),
    )
}

pub trait Scenario {
    /// Populate the habitat and register factories. Called once.
    fn setup(&mut self, ctx: &mut ScenarioContext<'_>) -> Result<()>;

    /// Runs before every tick.
    fn step(&mut self, _ctx: &mut ScenarioContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Starts with nothing and spawns nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyScenario;

impl Scenario for EmptyScenario {
    fn setup(&mut self, _ctx: &mut ScenarioContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// An animal and a blob in the middle, a few repellants, and a steady
/// trickle of feed and incoming meteors.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultScenario;

/// Feed nutrition, uniform in `[0.5, 2.5)`.
fn random_nutrition(rng: &mut dyn RandomSource) -> f64 {
    rng.next_unit() * 2.0 + 0.5
}

impl Scenario for DefaultScenario {
    fn setup(&mut self, ctx: &mut ScenarioContext<'_>) -> Result<()> {
        let start = Position::new(400.0, 400.0);
        ctx.habitat.add_object(SimObject::animal(start));
        ctx.habitat
            .add_object(SimObject::blob(Direction::EAST, start, 1.0));
        for _ in 0..ctx.config.initial_repellants {
            let pos = ctx.random_position();
            ctx.habitat.add_object(SimObject::repellant(pos));
        }

        ctx.registry
            .register("SimFeed™", Icon::Painter(paint_feed), |pos, _, rng| {
                SimObject::feed(pos, random_nutrition(rng))
            });
        ctx.registry
            .register("SimRepellant™", Icon::Painter(paint_repellant), |pos, _, _| {
                Ok(SimObject::repellant(pos))
            });
        ctx.registry
            .register("SimAnimal", Icon::Sprite("animal"), |pos, _, _| {
                Ok(SimObject::animal(pos))
            });
        ctx.registry
            .register("Meteor", Icon::Sprite("meteor"), |pos, _, rng| {
                let dir = Direction::new(rng.next_int(360) as f64);
                Ok(SimObject::meteor(dir, pos))
            });
        ctx.registry
            .register("Hunter", Icon::Sprite("hunter"), |pos, _, rng| {
                let dir = Direction::new(rng.next_int(360) as f64);
                Ok(SimObject::hunter(dir, pos))
            });
        ctx.registry
            .register("Prey", Icon::Sprite("prey"), |pos, _, rng| {
                let dir = Direction::new(rng.next_int(360) as f64);
                Ok(SimObject::prey(dir, pos))
            });

        info!(
            objects = ctx.habitat.len(),
            factories = ctx.registry.len(),
            "default scenario ready"
        );
        Ok(())
    }

    fn step(&mut self, ctx: &mut ScenarioContext<'_>) -> Result<()> {
        if ctx.rng.one_in(ctx.config.feed_spawn_one_in) {
            let pos = ctx.random_position();
            let feed = SimObject::feed(pos, random_nutrition(ctx.rng))?;
            debug!(x = pos.x, y = pos.y, "feed dropped");
            ctx.habitat.add_object(feed);
        }
        if let Some(odds) = ctx.config.meteor_spawn_one_in {
            if ctx.rng.one_in(odds) {
                let meteor = SimObject::incoming_meteor(ctx.habitat.width(), ctx.rng);
                debug!(x = meteor.position.x, "meteor incoming");
                ctx.habitat.add_object(meteor);
            }
        }
        Ok(())
    }
}
