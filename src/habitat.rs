//! The habitat: bounded area and sole owner of every simulation object.
//!
//! Objects are ECS entities in a private `World`; the `Entity` handle is the
//! stable identity callers hold on to. Objects never reference the habitat.
//! Their behaviour functions borrow it mutably for the length of one step.
//!
//! ## Tick sweep
//!
//! `tick` visits every live object once, in ascending `SimId` order. While the
//! sweep runs, additions and removals are buffered and only committed after
//! the last object has stepped, so the set being iterated never changes under
//! the sweep. Objects destroyed during the sweep are flagged immediately:
//! they vanish from proximity queries and are skipped if their turn has not
//! come yet.

use crate::components::*;
use crate::error::{Result, SimError};
use crate::geometry::{Direction, Position};
use crate::random::RandomSource;
use crate::render::{self, DrawContext};
use crate::spatial::SpatialGrid;
use crate::systems::{self, lifetime_system, metabolism_system};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Read-only copy of one object's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectView {
    pub entity: Entity,
    pub id: SimId,
    pub kind: Kind,
    pub position: Position,
    pub direction: Direction,
    pub health: Health,
    pub body: Body,
    /// Zero for stationary objects.
    pub speed: f64,
}

impl ObjectView {
    pub fn radius(&self) -> f64 {
        self.body.radius()
    }

    pub fn distance_to(&self, other: &ObjectView) -> f64 {
        self.position.distance_to(&other.position)
    }

    /// Centre distance minus both radii; `<= 0` means the circles overlap.
    pub fn distance_to_touch(&self, other: &ObjectView) -> f64 {
        self.distance_to(other) - self.radius() - other.radius()
    }

    pub fn direction_to(&self, other: &ObjectView) -> Direction {
        self.position.direction_to(&other.position)
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    /// Objects whose `step` ran.
    pub stepped: usize,
    /// Objects committed from the pending queue.
    pub added: usize,
    /// Objects removed at commit.
    pub removed: usize,
    /// Objects handed to the draw pass.
    pub drawn: usize,
}

pub struct Habitat {
    world: World,
    /// Per-tick upkeep (hunger, fading) run after the sweep.
    upkeep: Schedule,
    grid: SpatialGrid,
    width: f64,
    height: f64,
    next_id: u64,
    sweeping: bool,
    pending_spawns: Vec<SimObject>,
    pending_removals: Vec<Entity>,
}

impl Habitat {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        Self::with_cell_size(width, height, SpatialGrid::default().cell_size)
    }

    pub fn with_cell_size(width: f64, height: f64, cell_size: f64) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(SimError::InvalidHabitat { width, height });
        }
        if !(cell_size > 0.0) {
            return Err(SimError::Config(format!(
                "spatial cell size must be positive, got {}",
                cell_size
            )));
        }

        let mut upkeep = Schedule::default();
        upkeep.add_systems((metabolism_system, lifetime_system).chain());

        Ok(Self {
            world: World::new(),
            upkeep,
            grid: SpatialGrid::new(cell_size),
            width,
            height,
            next_id: 0,
            sweeping: false,
            pending_spawns: Vec::new(),
            pending_removals: Vec::new(),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether `pos` lies at least `margin` inside every edge.
    ///
    /// A negative margin extends the accepted area beyond the edges.
    pub fn contains(&self, pos: Position, margin: f64) -> bool {
        pos.x >= margin
            && pos.x <= self.width - margin
            && pos.y >= margin
            && pos.y <= self.height - margin
    }

    /// True while a tick sweep is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeping
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Add an object.
    ///
    /// Outside a sweep the object is inserted immediately and its entity is
    /// returned. During a sweep it is queued and `None` is returned; it
    /// becomes live when the sweep commits.
    pub fn add_object(&mut self, object: SimObject) -> Option<Entity> {
        if self.sweeping {
            self.pending_spawns.push(object);
            None
        } else {
            Some(self.spawn_now(object))
        }
    }

    fn spawn_now(&mut self, object: SimObject) -> Entity {
        let id = SimId(self.next_id);
        self.next_id += 1;

        let kind = object.kind;
        let position = object.position;
        let speed = object.speed;
        let metabolism = object.metabolism;
        let lifetime = object.lifetime;

        let mut entity = self.world.spawn(object.into_bundle(id));
        if let Some(speed) = speed {
            entity.insert(speed);
        }
        if let Some(metabolism) = metabolism {
            entity.insert(metabolism);
        }
        if let Some(lifetime) = lifetime {
            entity.insert(lifetime);
        }
        let entity = entity.id();

        self.grid.insert(entity, position.x, position.y, kind);
        debug!(
            id = id.0,
            kind = kind.name(),
            x = position.x,
            y = position.y,
            "object spawned"
        );
        entity
    }

    /// Flag an object dead and schedule its removal.
    ///
    /// Returns `false` if it was already destroyed or never existed; a second
    /// call changes nothing.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        if let Some(id) = self.world.get::<SimId>(entity).copied() {
            debug!(id = id.0, "object destroyed");
        }
        self.world.entity_mut(entity).insert(Destroyed);
        self.grid.remove(entity);
        if self.sweeping {
            self.pending_removals.push(entity);
        } else {
            self.world.despawn(entity);
        }
        true
    }

    /// Alias of [`Habitat::destroy`].
    pub fn remove_object(&mut self, entity: Entity) -> bool {
        self.destroy(entity)
    }

    /// Present in the habitat and not destroyed.
    pub fn is_live(&self, entity: Entity) -> bool {
        self.world.get::<SimId>(entity).is_some() && self.world.get::<Destroyed>(entity).is_none()
    }

    /// Destroyed, removed, or never known.
    pub fn is_destroyed(&self, entity: Entity) -> bool {
        !self.is_live(entity)
    }

    /// Live objects in sweep order.
    pub fn entities(&self) -> Vec<Entity> {
        let mut live: Vec<(SimId, Entity)> = self
            .world
            .iter_entities()
            .filter(|e| !e.contains::<Destroyed>())
            .filter_map(|e| e.get::<SimId>().map(|id| (*id, e.id())))
            .collect();
        live.sort_by_key(|(id, _)| *id);
        live.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.grid.total_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Additions waiting for the current sweep to commit.
    pub fn pending_len(&self) -> usize {
        self.pending_spawns.len()
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Copy of an object's state, destroyed objects included until removal.
    pub fn view(&self, entity: Entity) -> Option<ObjectView> {
        let world = &self.world;
        Some(ObjectView {
            entity,
            id: *world.get::<SimId>(entity)?,
            kind: *world.get::<Kind>(entity)?,
            position: *world.get::<Position>(entity)?,
            direction: *world.get::<Direction>(entity)?,
            health: *world.get::<Health>(entity)?,
            body: *world.get::<Body>(entity)?,
            speed: world.get::<Speed>(entity).map(|s| s.0).unwrap_or(0.0),
        })
    }

    /// Detached value of an object, comparable with other `SimObject`s.
    pub fn object(&self, entity: Entity) -> Option<SimObject> {
        let view = self.view(entity)?;
        Some(SimObject {
            kind: view.kind,
            position: view.position,
            direction: view.direction,
            health: view.health,
            body: view.body,
            speed: self.world.get::<Speed>(entity).copied(),
            metabolism: self.world.get::<Metabolism>(entity).copied(),
            lifetime: self.world.get::<Lifetime>(entity).copied(),
        })
    }

    /// Live objects of one kind, in sweep order.
    pub fn views_of(&self, predicate: impl Fn(Kind) -> bool) -> Vec<ObjectView> {
        self.entities()
            .into_iter()
            .filter_map(|e| self.view(e))
            .filter(|v| predicate(v.kind))
            .collect()
    }

    /// Nearest live object other than `from` whose centre lies within
    /// `within` and whose kind satisfies `predicate`.
    pub fn nearest(
        &self,
        from: &ObjectView,
        within: f64,
        predicate: impl Fn(Kind) -> bool,
    ) -> Option<ObjectView> {
        self.grid
            .nearest(from.position.x, from.position.y, within, from.entity, predicate)
            .and_then(|entry| self.view(entry.entity))
    }

    /// Every match for `nearest`, closest first.
    pub fn nearby(
        &self,
        from: &ObjectView,
        within: f64,
        predicate: impl Fn(Kind) -> bool,
    ) -> Vec<ObjectView> {
        self.grid
            .query_kind(from.position.x, from.position.y, within, predicate)
            .into_iter()
            .filter(|entry| entry.entity != from.entity)
            .filter_map(|entry| self.view(entry.entity))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Writes. All are no-ops on destroyed objects.
    // ------------------------------------------------------------------------

    /// Subtract `amount` from an object's health.
    pub fn damage(&mut self, entity: Entity, amount: f64) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        match self.world.get_mut::<Health>(entity) {
            Some(mut health) => {
                health.damage(amount);
                true
            }
            None => false,
        }
    }

    /// Subtract the object's default decrement.
    pub fn decrease_health(&mut self, entity: Entity) -> bool {
        match self.world.get::<Kind>(entity).copied() {
            Some(kind) => self.damage(entity, kind.default_damage()),
            None => false,
        }
    }

    /// Add health, clamped at the object's maximum.
    pub fn heal(&mut self, entity: Entity, amount: f64) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        match self.world.get_mut::<Health>(entity) {
            Some(mut health) => {
                health.heal(amount);
                true
            }
            None => false,
        }
    }

    pub fn set_direction(&mut self, entity: Entity, direction: Direction) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        match self.world.get_mut::<Direction>(entity) {
            Some(mut dir) => {
                *dir = direction;
                true
            }
            None => false,
        }
    }

    pub fn set_position(&mut self, entity: Entity, position: Position) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        let Some(kind) = self.world.get::<Kind>(entity).copied() else {
            return false;
        };
        match self.world.get_mut::<Position>(entity) {
            Some(mut pos) => {
                *pos = position;
            }
            None => return false,
        }
        self.grid.insert(entity, position.x, position.y, kind);
        true
    }

    /// Move an object `speed` units along its direction.
    pub fn advance(&mut self, entity: Entity) -> bool {
        let Some(view) = self.view(entity) else {
            return false;
        };
        if view.speed == 0.0 {
            return false;
        }
        self.set_position(entity, view.position.moved(view.direction, view.speed))
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Step every live object once, run upkeep, then commit queued changes.
    pub fn tick(&mut self, rng: &mut dyn RandomSource) -> TickReport {
        let order = self.entities();
        let mut report = TickReport::default();

        self.sweeping = true;
        for entity in order {
            if !self.is_live(entity) {
                trace!(?entity, "skipping object destroyed earlier this tick");
                continue;
            }
            systems::step_object(self, entity, rng);
            report.stepped += 1;
        }
        self.upkeep.run(&mut self.world);
        self.sweeping = false;

        let (added, removed) = self.commit();
        report.added = added;
        report.removed = removed;
        debug!(
            stepped = report.stepped,
            added,
            removed,
            live = self.len(),
            "tick committed"
        );
        report
    }

    /// Apply buffered removals, then buffered additions.
    fn commit(&mut self) -> (usize, usize) {
        let removals = std::mem::take(&mut self.pending_removals);
        let spawns = std::mem::take(&mut self.pending_spawns);

        let removed = removals
            .into_iter()
            .filter(|&entity| self.world.despawn(entity))
            .count();
        let added = spawns.len();
        for object in spawns {
            self.spawn_now(object);
        }
        (added, removed)
    }

    /// Hand every live object to its draw routine. Returns how many were drawn.
    pub fn draw(&self, ctx: &mut dyn DrawContext) -> usize {
        let mut drawn = 0;
        for entity in self.entities() {
            if let Some(view) = self.view(entity) {
                render::draw_object(&view, ctx);
                drawn += 1;
            }
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use std::collections::HashSet;

    fn quiet_rng() -> ScriptedRandom {
        // blob wander draws next_int(11); 5 maps to a zero turn
        ScriptedRandom::new().with_fallback(5, 0.5)
    }

    #[test]
    fn test_rejects_non_positive_size() {
        assert!(matches!(
            Habitat::new(0.0, 100.0),
            Err(SimError::InvalidHabitat { .. })
        ));
        assert!(Habitat::new(100.0, -5.0).is_err());
        assert!(Habitat::with_cell_size(100.0, 100.0, 0.0).is_err());
    }

    #[test]
    fn test_contains_with_margins() {
        let habitat = Habitat::new(800.0, 600.0).unwrap();
        assert!(habitat.contains(Position::new(400.0, 300.0), 0.0));
        assert!(!habitat.contains(Position::new(-1.0, 300.0), 0.0));
        assert!(!habitat.contains(Position::new(10.0, 300.0), 20.0));
        assert!(habitat.contains(Position::new(-100.0, 300.0), -150.0));
        assert!(habitat.contains(Position::new(950.0, 300.0), -150.0));
        assert!(!habitat.contains(Position::new(951.0, 300.0), -150.0));
    }

    #[test]
    fn test_add_outside_sweep_is_immediate() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let e = habitat
            .add_object(SimObject::repellant(Position::new(10.0, 10.0)))
            .unwrap();
        assert!(habitat.is_live(e));
        assert_eq!(habitat.len(), 1);
        assert_eq!(habitat.view(e).unwrap().kind, Kind::Repellant);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let e = habitat
            .add_object(SimObject::repellant(Position::new(10.0, 10.0)))
            .unwrap();
        let other = habitat
            .add_object(SimObject::repellant(Position::new(50.0, 10.0)))
            .unwrap();

        assert!(habitat.destroy(e));
        assert!(!habitat.destroy(e));
        assert!(!habitat.remove_object(e));
        assert!(habitat.is_destroyed(e));
        assert_eq!(habitat.len(), 1);
        assert!(habitat.is_live(other));
    }

    #[test]
    fn test_mutation_after_destroy_is_noop() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let e = habitat
            .add_object(SimObject::blob(Direction::EAST, Position::new(100.0, 100.0), 2.0))
            .unwrap();
        habitat.destroy(e);
        assert!(!habitat.damage(e, 1.0));
        assert!(!habitat.heal(e, 1.0));
        assert!(!habitat.set_direction(e, Direction::NORTH));
        assert!(!habitat.advance(e));
    }

    #[test]
    fn test_structurally_equal_objects_stay_distinct() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let a = habitat
            .add_object(SimObject::repellant(Position::new(10.0, 10.0)))
            .unwrap();
        let b = habitat
            .add_object(SimObject::repellant(Position::new(10.0, 10.0)))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(habitat.object(a), habitat.object(b));
        assert_eq!(habitat.len(), 2);
    }

    #[test]
    fn test_nearest_filters_kind_distance_and_self() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let me = habitat
            .add_object(SimObject::animal(Position::new(100.0, 100.0)))
            .unwrap();
        let far_feed = habitat
            .add_object(SimObject::feed(Position::new(300.0, 100.0), 1.0).unwrap())
            .unwrap();
        let near_feed = habitat
            .add_object(SimObject::feed(Position::new(150.0, 100.0), 1.0).unwrap())
            .unwrap();
        habitat.add_object(SimObject::repellant(Position::new(110.0, 100.0)));

        let view = habitat.view(me).unwrap();
        let found = habitat.nearest(&view, 400.0, |k| k == Kind::Feed).unwrap();
        assert_eq!(found.entity, near_feed);
        assert!(habitat.nearest(&view, 40.0, |k| k == Kind::Feed).is_none());
        assert!(habitat.nearest(&view, 400.0, |k| k == Kind::Animal).is_none());

        let all = habitat.nearby(&view, 400.0, |k| k == Kind::Feed);
        assert_eq!(all.iter().map(|v| v.entity).collect::<Vec<_>>(), vec![near_feed, far_feed]);

        habitat.destroy(near_feed);
        let found = habitat.nearest(&view, 400.0, |k| k == Kind::Feed).unwrap();
        assert_eq!(found.entity, far_feed);
    }

    #[test]
    fn test_tick_moves_objects_and_keeps_grid_in_sync() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let blob = habitat
            .add_object(SimObject::blob(Direction::EAST, Position::new(100.0, 100.0), 2.0))
            .unwrap();
        let mut rng = quiet_rng();

        let report = habitat.tick(&mut rng);
        assert_eq!(report.stepped, 1);
        let pos = habitat.view(blob).unwrap().position;
        assert!((pos.x - 102.0).abs() < 1e-9);
        assert!((pos.y - 100.0).abs() < 1e-9);

        let seeker = habitat
            .add_object(SimObject::repellant(Position::new(102.0, 130.0)))
            .unwrap();
        let seeker_view = habitat.view(seeker).unwrap();
        let found = habitat.nearest(&seeker_view, 31.0, |k| k == Kind::Blob);
        assert_eq!(found.map(|v| v.entity), Some(blob));
    }

    #[test]
    fn test_live_set_after_tick() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let mut rng = quiet_rng();

        let primary = habitat
            .add_object(SimObject::meteor(Direction::EAST, Position::new(400.0, 300.0)))
            .unwrap();
        let doomed_feed = habitat
            .add_object(SimObject::feed(Position::new(100.0, 500.0), 1.0).unwrap())
            .unwrap();
        let survivor = habitat
            .add_object(SimObject::repellant(Position::new(700.0, 50.0)))
            .unwrap();
        habitat.damage(primary, 1.0);
        habitat.damage(doomed_feed, 1.0);

        let before: HashSet<Entity> = habitat.entities().into_iter().collect();
        let report = habitat.tick(&mut rng);
        let after: HashSet<Entity> = habitat.entities().into_iter().collect();

        assert_eq!(report.removed, 2);
        assert_eq!(report.added, 2);
        let removed: HashSet<Entity> = [primary, doomed_feed].into_iter().collect();
        let kept: HashSet<Entity> = before.difference(&removed).copied().collect();
        let added: HashSet<Entity> = after.difference(&kept).copied().collect();
        assert!(after.contains(&survivor));
        assert_eq!(added.len(), 2);
        assert_eq!(after.len(), kept.len() + added.len());
        for e in added {
            assert_eq!(
                habitat.view(e).unwrap().kind,
                Kind::Meteor(MeteorStage::Fragment)
            );
        }
    }

    #[test]
    fn test_objects_added_mid_tick_are_not_stepped() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let mut rng = quiet_rng();

        let primary = habitat
            .add_object(SimObject::meteor(Direction::EAST, Position::new(400.0, 300.0)))
            .unwrap();
        habitat.damage(primary, 1.0);

        let report = habitat.tick(&mut rng);
        assert_eq!(report.stepped, 1);

        // fragments spawn at x = 400 +/- 30 and have not moved yet
        let mut xs: Vec<f64> = habitat
            .views_of(|k| k.is_meteor())
            .iter()
            .map(|v| v.position.x)
            .collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![370.0, 430.0]);

        let report = habitat.tick(&mut rng);
        assert_eq!(report.stepped, 2);
    }

    #[test]
    fn test_destroyed_objects_are_never_stepped_again() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        let mut rng = quiet_rng();
        let blob = habitat
            .add_object(SimObject::blob(Direction::EAST, Position::new(100.0, 100.0), 2.0))
            .unwrap();
        habitat.destroy(blob);

        let report = habitat.tick(&mut rng);
        assert_eq!(report.stepped, 0);
        assert!(habitat.view(blob).is_none());
    }

    #[test]
    fn test_draw_visits_each_live_object_once() {
        let mut habitat = Habitat::new(800.0, 600.0).unwrap();
        habitat.add_object(SimObject::meteor(Direction::EAST, Position::new(400.0, 300.0)));
        habitat.add_object(SimObject::animal(Position::new(100.0, 100.0)));
        let gone = habitat
            .add_object(SimObject::prey(Direction::EAST, Position::new(200.0, 200.0)))
            .unwrap();
        habitat.destroy(gone);

        let mut canvas = crate::render::RecordingCanvas::new();
        assert_eq!(habitat.draw(&mut canvas), 2);
        assert_eq!(canvas.calls.len(), 2);
        assert_eq!(canvas.sprites_named("prey").count(), 0);
    }
}
