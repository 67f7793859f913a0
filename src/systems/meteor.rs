//! Meteor behaviour: ship impacts, rebounds, splitting and rewards.

use crate::components::{Kind, MeteorStage, SimObject, STAR_LIFETIME};
use crate::geometry::{Direction, Position};
use crate::habitat::{Habitat, ObjectView};
use crate::random::RandomSource;
use crate::systems::movement::{despawn_if_lost, DESPAWN_MARGIN};
use tracing::{debug, trace, warn};

/// Search radius for ships.
pub const SHIP_RANGE: f64 = 100.0;
/// Search radius for other meteors.
pub const METEOR_RANGE: f64 = 175.0;
/// Health a ship loses when a meteor runs into it.
pub const SHIP_IMPACT_DAMAGE: f64 = 0.4;
/// Gap at which two meteors count as touching.
pub const TOUCH_TOLERANCE: f64 = 0.5;
/// Overlap beyond which a meteor collision also costs health.
///
/// A deep impact does not break the meteor up on the spot. It takes the
/// meteor's default damage (0.5) and still rebounds, so two deep hits finish
/// a fresh meteor and it splits (or leaves its reward) on its next step.
pub const DEEP_IMPACT_OVERLAP: f64 = 5.0;
/// Width of the rebound spread, centred on straight back.
pub const REBOUND_SPREAD: u32 = 120;

pub fn step_meteor(habitat: &mut Habitat, me: &ObjectView, rng: &mut dyn RandomSource) {
    let mut heading = me.direction;

    if let Some(ship) = habitat.nearest(me, SHIP_RANGE, |k| k.is_ship()) {
        if me.distance_to_touch(&ship) <= 0.0 {
            heading = Direction::new(ship.direction.to_angle() + heading.to_angle());
            habitat.damage(ship.entity, SHIP_IMPACT_DAMAGE);
            trace!(meteor = me.id.0, ship = ship.id.0, "meteor hit ship");
        }
    }

    if let Some(other) = habitat.nearest(me, METEOR_RANGE, |k| k.is_meteor()) {
        if me.distance_to_touch(&other) <= TOUCH_TOLERANCE {
            if me.distance_to(&other) < me.radius() + other.radius() - DEEP_IMPACT_OVERLAP {
                habitat.decrease_health(me.entity);
            }
            heading = rebound(heading, rng);
            trace!(meteor = me.id.0, other = other.id.0, "meteor rebound");
        }
    }

    if despawn_if_lost(habitat, me, DESPAWN_MARGIN) {
        return;
    }

    habitat.set_direction(me.entity, heading);
    habitat.advance(me.entity);
}

/// Roughly reverse `heading`, spread by up to 60 degrees either way.
pub fn rebound(heading: Direction, rng: &mut dyn RandomSource) -> Direction {
    let spread = rng.next_int(REBOUND_SPREAD) as f64 - (REBOUND_SPREAD / 2) as f64;
    Direction::new(heading.to_angle() + 180.0 + spread)
}

/// Split a primary meteor into two half-size fragments flying apart.
pub fn split(habitat: &mut Habitat, me: &ObjectView) {
    let body = me.body.halved();
    let offset = me.radius() / 2.0;
    let pos = me.position;

    for (dx, heading) in [(offset, me.direction), (-offset, me.direction.turn_back())] {
        let fragment = SimObject::new(
            Kind::Meteor(MeteorStage::Fragment),
            Position::new(pos.x + dx, pos.y),
            heading,
            body,
        )
        .with_speed(me.speed);
        habitat.add_object(fragment);
    }
    debug!(id = me.id.0, "meteor split");
}

/// Leave a silver star where a fragment burned out.
pub fn leave_reward(habitat: &mut Habitat, me: &ObjectView, rng: &mut dyn RandomSource) {
    let nutrition = rng.next_unit() * 2.0 + 0.5;
    match SimObject::silver_star(me.position, nutrition, STAR_LIFETIME) {
        Ok(star) => {
            habitat.add_object(star);
        }
        Err(err) => warn!(%err, "could not create reward star"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Health;
    use crate::random::ScriptedRandom;

    fn habitat() -> Habitat {
        Habitat::new(800.0, 600.0).unwrap()
    }

    #[test]
    fn test_primary_splits_into_opposite_half_size_fragments() {
        let mut habitat = habitat();
        let mut rng = ScriptedRandom::new();
        let parent = habitat
            .add_object(SimObject::meteor(Direction::new(30.0), Position::new(400.0, 300.0)))
            .unwrap();
        habitat.damage(parent, 1.0);

        habitat.tick(&mut rng);

        assert!(habitat.view(parent).is_none());
        let fragments = habitat.views_of(|k| k == Kind::Meteor(MeteorStage::Fragment));
        assert_eq!(fragments.len(), 2);
        assert_eq!(habitat.len(), 2);
        for f in &fragments {
            assert_eq!(f.body.width(), 60.0);
            assert_eq!(f.body.height(), 60.0);
            assert_eq!(f.speed, crate::components::METEOR_SPEED);
        }
        let gap = fragments[0].direction.angle_to(fragments[1].direction);
        assert!((gap.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_fragment_leaves_exactly_one_reward() {
        let mut habitat = habitat();
        let mut rng = ScriptedRandom::new().with_units([0.25]);
        let fragment = habitat
            .add_object(
                SimObject::meteor_fragment(Direction::EAST, Position::new(200.0, 200.0), 60.0, 60.0)
                    .unwrap(),
            )
            .unwrap();
        habitat.damage(fragment, 1.0);

        habitat.tick(&mut rng);

        assert!(habitat.view(fragment).is_none());
        let stars = habitat.views_of(|k| k == Kind::SilverStar);
        assert_eq!(stars.len(), 1);
        assert_eq!(stars[0].position, Position::new(200.0, 200.0));
        assert!((stars[0].health.max - 1.0).abs() < 1e-12);
        assert_eq!(habitat.len(), 1);

        // the reward is not a second terminal action on a later tick
        habitat.tick(&mut rng);
        assert_eq!(habitat.views_of(|k| k == Kind::SilverStar).len(), 1);
    }

    #[test]
    fn test_overlapping_meteors_rebound_by_scripted_draws() {
        let mut habitat = habitat();
        let mut rng = ScriptedRandom::new().with_ints([10, 100]);
        let a = habitat
            .add_object(SimObject::meteor(Direction::new(0.0), Position::new(300.0, 300.0)))
            .unwrap();
        let b = habitat
            .add_object(SimObject::meteor(Direction::new(200.0), Position::new(360.0, 300.0)))
            .unwrap();

        habitat.tick(&mut rng);

        let a_after = habitat.view(a).unwrap();
        let b_after = habitat.view(b).unwrap();
        assert!((a_after.direction.to_angle() - (0.0 + 180.0 + 10.0 - 60.0)).abs() < 1e-9);
        assert!((b_after.direction.to_angle() - (200.0 + 180.0 + 100.0 - 60.0 - 360.0)).abs() < 1e-9);

        // both impacts were deep
        assert_eq!(a_after.health.current, 0.5);
        assert_eq!(b_after.health.current, 0.5);
        assert_eq!(rng.remaining_ints(), 0);
    }

    #[test]
    fn test_two_deep_impacts_lead_to_split_next_tick() {
        let mut habitat = habitat();
        let mut rng = ScriptedRandom::new().with_fallback(60, 0.5);
        let a = habitat
            .add_object(
                SimObject::meteor(Direction::EAST, Position::new(300.0, 300.0))
                    .with_health(Health { current: 0.5, max: 1.0 }),
            )
            .unwrap();
        habitat
            .add_object(SimObject::meteor(Direction::WEST, Position::new(340.0, 300.0)));

        habitat.tick(&mut rng);
        assert!(!habitat.view(a).unwrap().health.is_alive());

        habitat.tick(&mut rng);
        assert!(habitat.view(a).is_none());
        assert_eq!(
            habitat
                .views_of(|k| k == Kind::Meteor(MeteorStage::Fragment))
                .len(),
            2
        );
    }

    #[test]
    fn test_meteor_far_outside_is_destroyed_regardless_of_health() {
        let mut habitat = habitat();
        let mut rng = ScriptedRandom::new();
        let x = 800.0 + DESPAWN_MARGIN + 60.0 + 1.0;
        let gone = habitat
            .add_object(SimObject::meteor(Direction::EAST, Position::new(x, 300.0)))
            .unwrap();
        let kept = habitat
            .add_object(SimObject::meteor(Direction::EAST, Position::new(x - 2.0, 300.0 + 500.0)))
            .unwrap();

        let report = habitat.tick(&mut rng);

        assert!(habitat.is_destroyed(gone));
        assert!(habitat.is_live(kept));
        assert_eq!(report.removed, 1);
        // no terminal action on the way out
        assert_eq!(report.added, 0);
    }

    #[test]
    fn test_meteor_hitting_ship_turns_and_damages_it() {
        let mut habitat = habitat();
        let mut rng = ScriptedRandom::new();
        let meteor = habitat
            .add_object(SimObject::meteor(Direction::new(10.0), Position::new(300.0, 300.0)))
            .unwrap();
        let prey = habitat
            .add_object(SimObject::prey(Direction::new(20.0), Position::new(350.0, 300.0)))
            .unwrap();

        habitat.tick(&mut rng);

        let meteor = habitat.view(meteor).unwrap();
        assert!((meteor.direction.to_angle() - 30.0).abs() < 1e-9);
        let prey = habitat.view(prey).unwrap();
        // 0.4 from the meteor, a little more from hunger
        assert!(prey.health.current < 0.6 + 1e-9);
        assert!(prey.health.current > 0.59);
    }

    #[test]
    fn test_rebound_stays_within_spread() {
        let mut rng = ScriptedRandom::new().with_ints([0, 119]);
        let low = rebound(Direction::EAST, &mut rng);
        let high = rebound(Direction::EAST, &mut rng);
        assert_eq!(low.to_angle(), 120.0);
        assert_eq!(high.to_angle(), 239.0);
    }
}
