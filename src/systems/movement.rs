//! Movement helpers shared by every moving kind.

use crate::geometry::{Direction, Position};
use crate::habitat::{Habitat, ObjectView};
use tracing::debug;

/// Degrees per tick an object turns back toward the centre once it strays.
pub const EDGE_TURN: f64 = 5.0;
/// How far past the edge, beyond its own radius, an object may drift before
/// it is dropped.
pub const DESPAWN_MARGIN: f64 = 150.0;

/// Turn toward `target`, at most `max_turn` degrees.
pub fn steer_towards(heading: Direction, from: Position, target: Position, max_turn: f64) -> Direction {
    heading.turn_towards(from.direction_to(&target), max_turn)
}

/// Turn away from `threat`, at most `max_turn` degrees.
pub fn steer_away(heading: Direction, from: Position, threat: Position, max_turn: f64) -> Direction {
    heading.turn_towards(from.direction_to(&threat).turn_back(), max_turn)
}

/// Bend `heading` toward the habitat centre while the body pokes past an edge.
pub fn steer_inside(habitat: &Habitat, me: &ObjectView, heading: Direction) -> Direction {
    if habitat.contains(me.position, me.radius()) {
        heading
    } else {
        steer_towards(heading, me.position, habitat.center(), EDGE_TURN)
    }
}

/// Destroy the object if it drifted more than `margin` plus its radius
/// outside the habitat. No terminal action runs. Returns true when dropped.
pub fn despawn_if_lost(habitat: &mut Habitat, me: &ObjectView, margin: f64) -> bool {
    if habitat.contains(me.position, -margin - me.radius()) {
        return false;
    }
    debug!(
        id = me.id.0,
        kind = me.kind.name(),
        x = me.position.x,
        y = me.position.y,
        "object left habitat"
    );
    habitat.destroy(me.entity);
    true
}

/// Commit `heading` and move `speed` units along it.
pub fn move_along(habitat: &mut Habitat, me: &ObjectView, heading: Direction) {
    habitat.set_direction(me.entity, heading);
    habitat.advance(me.entity);
}
