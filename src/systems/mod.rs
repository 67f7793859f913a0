//! Behaviour for every object kind.
//!
//! Per-object steps run inside the habitat's sweep, one object at a time,
//! with mutable access to the whole habitat:
//!
//! - `meteor` - collisions, rebounds, splitting and rewards
//! - `creatures` - animal, hunter, prey and blob steering and feeding
//! - `items` - feed, repellants and silver stars
//! - `movement` - shared steering and straight-line advance
//!
//! Upkeep that touches every object the same way runs as ECS systems after
//! the sweep:
//!
//! - `metabolism_system` - hunger drain
//! - `lifetime_system` - fading of timed items

pub mod creatures;
pub mod items;
pub mod meteor;
pub mod movement;
pub mod upkeep;

pub use movement::*;
pub use upkeep::*;

use crate::components::{Kind, MeteorStage};
use crate::habitat::{Habitat, ObjectView};
use crate::random::RandomSource;
use bevy_ecs::prelude::Entity;
use tracing::debug;

/// Run one object's behaviour for this tick.
///
/// An object at or below zero health runs its terminal action instead and is
/// destroyed. Destroyed objects are never handed back here, so the terminal
/// action runs once.
pub fn step_object(habitat: &mut Habitat, entity: Entity, rng: &mut dyn RandomSource) {
    let Some(me) = habitat.view(entity) else {
        return;
    };

    if !me.health.is_alive() {
        debug!(id = me.id.0, kind = me.kind.name(), "terminal action");
        terminal_action(habitat, &me, rng);
        habitat.destroy(entity);
        return;
    }

    match me.kind {
        Kind::Meteor(_) => meteor::step_meteor(habitat, &me, rng),
        Kind::Animal => creatures::step_animal(habitat, &me),
        Kind::Hunter => creatures::step_hunter(habitat, &me),
        Kind::Prey => creatures::step_prey(habitat, &me),
        Kind::Blob => creatures::step_blob(habitat, &me, rng),
        Kind::SilverStar => items::step_silver_star(habitat, &me),
        Kind::Feed | Kind::Repellant => {}
    }
}

fn terminal_action(habitat: &mut Habitat, me: &ObjectView, rng: &mut dyn RandomSource) {
    match me.kind {
        Kind::Meteor(MeteorStage::Primary) => meteor::split(habitat, me),
        Kind::Meteor(MeteorStage::Fragment) => meteor::leave_reward(habitat, me, rng),
        Kind::Hunter => creatures::replace_hunter(habitat, rng),
        Kind::Prey => creatures::drop_remains(habitat, me, rng),
        Kind::Animal | Kind::Blob | Kind::Feed | Kind::Repellant | Kind::SilverStar => {}
    }
}
