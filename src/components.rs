//! ECS Components for the habitat simulation.
//!
//! Components are pure data containers attached to entities.
//! Behaviour lives in `systems`, which reads and writes these through the
//! `Habitat`.

use crate::error::{Result, SimError};
use crate::geometry::{Direction, Position};
use crate::random::RandomSource;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

// ============================================================================
// TUNING
// ============================================================================

pub const METEOR_SPEED: f64 = 1.75;
pub const METEOR_SIZE: f64 = 120.0;
pub const ANIMAL_SPEED: f64 = 1.0;
pub const ANIMAL_SIZE: f64 = 50.0;
pub const ANIMAL_HUNGER: f64 = 0.001;
pub const HUNTER_SPEED: f64 = 1.5;
pub const HUNTER_SIZE: f64 = 60.0;
pub const PREY_SPEED: f64 = 1.8;
pub const PREY_SIZE: f64 = 50.0;
pub const SHIP_HUNGER: f64 = 0.0005;
pub const BLOB_SIZE: f64 = 40.0;
pub const REPELLANT_SIZE: f64 = 40.0;
pub const FEED_SIZE_PER_NUTRITION: f64 = 25.0;
pub const STAR_SIZE_PER_NUTRITION: f64 = 20.0;
pub const STAR_LIFETIME: u32 = 1200;

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Insertion-ordered identifier. Sweeps visit objects in ascending id order.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimId(pub u64);

/// Generation of a meteor: primaries split, fragments leave a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeteorStage {
    Primary,
    Fragment,
}

/// What an object is. Drives behaviour dispatch and proximity predicates.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Meteor(MeteorStage),
    Animal,
    Hunter,
    Prey,
    Blob,
    Feed,
    Repellant,
    SilverStar,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Meteor(MeteorStage::Primary) => "Meteor",
            Kind::Meteor(MeteorStage::Fragment) => "MeteorFragment",
            Kind::Animal => "Animal",
            Kind::Hunter => "Hunter",
            Kind::Prey => "Prey",
            Kind::Blob => "Blob",
            Kind::Feed => "Feed",
            Kind::Repellant => "Repellant",
            Kind::SilverStar => "SilverStar",
        }
    }

    pub fn is_meteor(&self) -> bool {
        matches!(self, Kind::Meteor(_))
    }

    /// Hunters and prey are the "ships" meteors collide with.
    pub fn is_ship(&self) -> bool {
        matches!(self, Kind::Hunter | Kind::Prey)
    }

    pub fn is_edible(&self) -> bool {
        matches!(self, Kind::Feed | Kind::SilverStar)
    }

    /// Health lost by a `decrease_health` call without an explicit amount.
    pub fn default_damage(&self) -> f64 {
        match self {
            Kind::Meteor(_) => 0.5,
            _ => 0.1,
        }
    }
}

/// Marker for objects that have been destroyed but not yet removed.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Destroyed;

// ============================================================================
// STATE COMPONENTS
// ============================================================================

/// Health of an object. Damage may push it below zero.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn new(max: f64) -> Self {
        Self { current: max, max }
    }

    pub fn fraction(&self) -> f64 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn damage(&mut self, amount: f64) {
        self.current -= amount;
    }

    pub fn heal(&mut self, amount: f64) {
        self.current = (self.current + amount).min(self.max);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Width and height of an object; both strictly positive.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    width: f64,
    height: f64,
}

impl Body {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        // written as negations so NaN is rejected too
        if !(width > 0.0) {
            return Err(SimError::InvalidWidth(width));
        }
        if !(height > 0.0) {
            return Err(SimError::InvalidHeight(height));
        }
        Ok(Self { width, height })
    }

    pub fn square(side: f64) -> Result<Self> {
        Self::new(side, side)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn radius(&self) -> f64 {
        self.width.max(self.height) / 2.0
    }

    pub fn halved(&self) -> Self {
        Self {
            width: self.width / 2.0,
            height: self.height / 2.0,
        }
    }
}

/// Distance travelled per tick along the object's direction.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed(pub f64);

/// Health drained every tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metabolism {
    pub drain_per_tick: f64,
}

/// Ticks left before the object fades.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining: u32,
}

// ============================================================================
// OBJECT BLUEPRINT
// ============================================================================

/// Bundle for spawning a simulation object entity.
#[derive(Bundle)]
pub struct SimObjectBundle {
    pub id: SimId,
    pub kind: Kind,
    pub position: Position,
    pub direction: Direction,
    pub health: Health,
    pub body: Body,
}

/// Detached value holding every component of one object.
///
/// Used to hand new objects to the habitat and to read them back out.
/// Equality is structural: two objects with equal fields are equal even when
/// they live in the habitat as separate entities.
#[derive(Debug, Clone, PartialEq)]
pub struct SimObject {
    pub kind: Kind,
    pub position: Position,
    pub direction: Direction,
    pub health: Health,
    pub body: Body,
    pub speed: Option<Speed>,
    pub metabolism: Option<Metabolism>,
    pub lifetime: Option<Lifetime>,
}

impl SimObject {
    /// A stationary object with full default health.
    pub fn new(kind: Kind, position: Position, direction: Direction, body: Body) -> Self {
        Self {
            kind,
            position,
            direction,
            health: Health::default(),
            body,
            speed: None,
            metabolism: None,
            lifetime: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(Speed(speed));
        self
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    pub fn with_metabolism(mut self, drain_per_tick: f64) -> Self {
        self.metabolism = Some(Metabolism { drain_per_tick });
        self
    }

    pub fn with_lifetime(mut self, ticks: u32) -> Self {
        self.lifetime = Some(Lifetime { remaining: ticks });
        self
    }

    pub fn radius(&self) -> f64 {
        self.body.radius()
    }

    pub fn is_moving(&self) -> bool {
        self.speed.is_some()
    }

    pub(crate) fn into_bundle(self, id: SimId) -> SimObjectBundle {
        SimObjectBundle {
            id,
            kind: self.kind,
            position: self.position,
            direction: self.direction,
            health: self.health,
            body: self.body,
        }
    }

    // ------------------------------------------------------------------------
    // Meteors
    // ------------------------------------------------------------------------

    /// Full-size primary meteor.
    pub fn meteor(dir: Direction, pos: Position) -> Self {
        Self::new(
            Kind::Meteor(MeteorStage::Primary),
            pos,
            dir,
            Body {
                width: METEOR_SIZE,
                height: METEOR_SIZE,
            },
        )
        .with_speed(METEOR_SPEED)
    }

    /// Fragment left behind by a splitting meteor.
    pub fn meteor_fragment(dir: Direction, pos: Position, width: f64, height: f64) -> Result<Self> {
        Ok(Self::new(
            Kind::Meteor(MeteorStage::Fragment),
            pos,
            dir,
            Body::new(width, height)?,
        )
        .with_speed(METEOR_SPEED))
    }

    /// Meteor entering from above the habitat, aimed at a random point in
    /// its upper part.
    pub fn incoming_meteor(habitat_width: f64, rng: &mut dyn RandomSource) -> Self {
        let x = rng.next_int((habitat_width * 1.1) as u32) as f64;
        let start = Position::new(x, -100.0);
        let target = Position::new(
            rng.next_int(habitat_width as u32) as f64,
            rng.next_int((habitat_width / 2.0) as u32) as f64 + 200.0,
        );
        let dir = Direction::SOUTH.turn_towards(start.direction_to(&target), 180.0);
        Self::meteor(dir, start)
    }

    // ------------------------------------------------------------------------
    // Creatures
    // ------------------------------------------------------------------------

    pub fn animal(pos: Position) -> Self {
        Self::new(
            Kind::Animal,
            pos,
            Direction::EAST,
            Body {
                width: ANIMAL_SIZE,
                height: ANIMAL_SIZE,
            },
        )
        .with_speed(ANIMAL_SPEED)
        .with_metabolism(ANIMAL_HUNGER)
    }

    pub fn hunter(dir: Direction, pos: Position) -> Self {
        Self::new(
            Kind::Hunter,
            pos,
            dir,
            Body {
                width: HUNTER_SIZE,
                height: HUNTER_SIZE,
            },
        )
        .with_speed(HUNTER_SPEED)
        .with_metabolism(SHIP_HUNGER)
    }

    pub fn prey(dir: Direction, pos: Position) -> Self {
        Self::new(
            Kind::Prey,
            pos,
            dir,
            Body {
                width: PREY_SIZE,
                height: PREY_SIZE,
            },
        )
        .with_speed(PREY_SPEED)
        .with_metabolism(SHIP_HUNGER)
    }

    pub fn blob(dir: Direction, pos: Position, speed: f64) -> Self {
        Self::new(
            Kind::Blob,
            pos,
            dir,
            Body {
                width: BLOB_SIZE,
                height: BLOB_SIZE,
            },
        )
        .with_speed(speed)
    }

    // ------------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------------

    /// Edible pellet; its health is the nutrition left in it.
    pub fn feed(pos: Position, nutrition: f64) -> Result<Self> {
        Ok(Self::new(
            Kind::Feed,
            pos,
            Direction::EAST,
            Body::square(FEED_SIZE_PER_NUTRITION * nutrition)?,
        )
        .with_health(Health::new(nutrition)))
    }

    pub fn repellant(pos: Position) -> Self {
        Self::new(
            Kind::Repellant,
            pos,
            Direction::EAST,
            Body {
                width: REPELLANT_SIZE,
                height: REPELLANT_SIZE,
            },
        )
    }

    /// Collectible reward that fades after `lifetime` ticks.
    pub fn silver_star(pos: Position, nutrition: f64, lifetime: u32) -> Result<Self> {
        Ok(Self::new(
            Kind::SilverStar,
            pos,
            Direction::EAST,
            Body::square(STAR_SIZE_PER_NUTRITION * nutrition)?,
        )
        .with_health(Health::new(nutrition))
        .with_lifetime(lifetime))
    }
}

fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    // fold -0.0 into 0.0 so Hash agrees with PartialEq
    let value = if value == 0.0 { 0.0 } else { value };
    value.to_bits().hash(state);
}

impl Hash for SimObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        hash_f64(self.position.x, state);
        hash_f64(self.position.y, state);
        hash_f64(self.direction.to_angle(), state);
        hash_f64(self.health.current, state);
        hash_f64(self.health.max, state);
        hash_f64(self.body.width, state);
        hash_f64(self.body.height, state);
        self.speed.map(|s| s.0).is_some().hash(state);
        hash_f64(self.speed.map(|s| s.0).unwrap_or(0.0), state);
    }
}
