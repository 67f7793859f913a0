//! Upkeep systems run once per tick after the behaviour sweep.

use crate::components::*;
use bevy_ecs::prelude::*;

/// Drains health from everything that gets hungry.
pub fn metabolism_system(mut query: Query<(&Metabolism, &mut Health), Without<Destroyed>>) {
    for (metabolism, mut health) in query.iter_mut() {
        health.damage(metabolism.drain_per_tick);
    }
}

/// Counts down timed objects; at zero their health drops to zero so the
/// next sweep runs their terminal action.
pub fn lifetime_system(mut query: Query<(&mut Lifetime, &mut Health), Without<Destroyed>>) {
    for (mut lifetime, mut health) in query.iter_mut() {
        lifetime.remaining = lifetime.remaining.saturating_sub(1);
        if lifetime.remaining == 0 && health.is_alive() {
            health.current = 0.0;
        }
    }
}
