//! Static items. Feed and repellants only react through their terminal
//! action; silver stars spin in place until eaten or faded.

use crate::habitat::{Habitat, ObjectView};

/// Degrees a silver star spins per tick.
pub const STAR_SPIN: f64 = 2.0;

pub fn step_silver_star(habitat: &mut Habitat, me: &ObjectView) {
    habitat.set_direction(me.entity, me.direction.turn(STAR_SPIN));
}
