//! Creature behaviour: animals, hunters, prey and blobs.
//!
//! Every creature picks a heading from what it sees, bends it back inside
//! the habitat if needed, then moves. Threats always win over food. A
//! creature that has drifted far outside is dropped before it acts.

use crate::components::{Kind, SimObject, STAR_LIFETIME};
use crate::geometry::{Direction, Position};
use crate::habitat::{Habitat, ObjectView};
use crate::random::RandomSource;
use crate::systems::movement::{
    despawn_if_lost, move_along, steer_away, steer_inside, steer_towards, DESPAWN_MARGIN,
};
use tracing::{trace, warn};

/// Distance at which repellants scare animals and hunters.
pub const REPELLANT_RANGE: f64 = 150.0;
/// How far creatures look for food or prey.
pub const SIGHT_RANGE: f64 = 400.0;

pub const ANIMAL_TURN: f64 = 5.0;
/// Most nutrition an animal takes from feed in one tick.
pub const ANIMAL_BITE: f64 = 0.1;

pub const HUNTER_TURN: f64 = 4.0;
pub const HUNTER_STRIKE: f64 = 0.2;
pub const HUNTER_RECOIL: f64 = 0.05;

pub const PREY_ALERT_RANGE: f64 = 250.0;
pub const PREY_TURN: f64 = 6.0;
pub const PREY_BITE: f64 = 0.25;

/// Largest wander turn either way, in degrees.
pub const BLOB_WANDER: u32 = 5;

pub fn step_animal(habitat: &mut Habitat, me: &ObjectView) {
    if despawn_if_lost(habitat, me, DESPAWN_MARGIN) {
        return;
    }
    let mut heading = me.direction;

    if let Some(repellant) = habitat.nearest(me, REPELLANT_RANGE, |k| k == Kind::Repellant) {
        heading = steer_away(heading, me.position, repellant.position, ANIMAL_TURN);
    } else if let Some(feed) = habitat.nearest(me, SIGHT_RANGE, |k| k == Kind::Feed) {
        heading = steer_towards(heading, me.position, feed.position, ANIMAL_TURN);
        if me.distance_to_touch(&feed) <= 0.0 {
            eat(habitat, me, &feed, ANIMAL_BITE);
        }
    }

    let heading = steer_inside(habitat, me, heading);
    move_along(habitat, me, heading);
}

pub fn step_hunter(habitat: &mut Habitat, me: &ObjectView) {
    if despawn_if_lost(habitat, me, DESPAWN_MARGIN) {
        return;
    }
    let mut heading = me.direction;

    if let Some(repellant) = habitat.nearest(me, REPELLANT_RANGE, |k| k == Kind::Repellant) {
        heading = steer_away(heading, me.position, repellant.position, HUNTER_TURN);
    } else if let Some(prey) = habitat.nearest(me, SIGHT_RANGE, |k| k == Kind::Prey) {
        heading = steer_towards(heading, me.position, prey.position, HUNTER_TURN);
        if me.distance_to_touch(&prey) <= 0.0 {
            habitat.damage(prey.entity, HUNTER_STRIKE);
            habitat.damage(me.entity, HUNTER_RECOIL);
            heading = heading.turn_back();
            trace!(hunter = me.id.0, prey = prey.id.0, "hunter struck prey");
        }
    }

    let heading = steer_inside(habitat, me, heading);
    move_along(habitat, me, heading);
}

pub fn step_prey(habitat: &mut Habitat, me: &ObjectView) {
    if despawn_if_lost(habitat, me, DESPAWN_MARGIN) {
        return;
    }
    let mut heading = me.direction;

    if let Some(hunter) = habitat.nearest(me, PREY_ALERT_RANGE, |k| k == Kind::Hunter) {
        heading = steer_away(heading, me.position, hunter.position, PREY_TURN);
    } else if let Some(star) = habitat.nearest(me, SIGHT_RANGE, |k| k == Kind::SilverStar) {
        heading = steer_towards(heading, me.position, star.position, PREY_TURN);
        if me.distance_to_touch(&star) <= 0.0 {
            eat(habitat, me, &star, PREY_BITE);
        }
    }

    let heading = steer_inside(habitat, me, heading);
    move_along(habitat, me, heading);
}

pub fn step_blob(habitat: &mut Habitat, me: &ObjectView, rng: &mut dyn RandomSource) {
    if despawn_if_lost(habitat, me, DESPAWN_MARGIN) {
        return;
    }
    let wander = rng.next_int(BLOB_WANDER * 2 + 1) as f64 - BLOB_WANDER as f64;
    let heading = steer_inside(habitat, me, me.direction.turn(wander));
    move_along(habitat, me, heading);
}

/// Move up to `bite` health from `food` to `eater`.
fn eat(habitat: &mut Habitat, eater: &ObjectView, food: &ObjectView, bite: f64) {
    let amount = bite.min(food.health.current.max(0.0));
    if amount <= 0.0 {
        return;
    }
    habitat.damage(food.entity, amount);
    habitat.heal(eater.entity, amount);
    trace!(eater = eater.id.0, food = food.id.0, amount, "ate");
}

/// Send a fresh hunter in from a random point on the top edge.
pub fn replace_hunter(habitat: &mut Habitat, rng: &mut dyn RandomSource) {
    let x = rng.next_int(habitat.width() as u32) as f64;
    habitat.add_object(SimObject::hunter(Direction::SOUTH, Position::new(x, 0.0)));
}

/// Leave a silver star where prey died.
pub fn drop_remains(habitat: &mut Habitat, me: &ObjectView, rng: &mut dyn RandomSource) {
    let nutrition = rng.next_unit() * 2.0 + 0.5;
    match SimObject::silver_star(me.position, nutrition, STAR_LIFETIME) {
        Ok(star) => {
            habitat.add_object(star);
        }
        Err(err) => warn!(%err, "could not create prey remains"),
    }
}
