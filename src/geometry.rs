//! Geometry primitives: positions and headings in habitat space.
//!
//! The habitat uses screen coordinates: x grows to the east, y grows downward.
//! A heading of 0° points along +x and 90° along +y, so increasing angles turn
//! clockwise on screen. `Position::direction_to` and `Direction::dx`/`dy` use
//! the same convention, which keeps distance, steering and movement consistent.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// 2D position in the habitat.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Heading of the vector from `self` to `other`.
    pub fn direction_to(&self, other: &Position) -> Direction {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        Direction::new(dy.atan2(dx).to_degrees())
    }

    /// Position reached after travelling `distance` along `dir`.
    pub fn moved(&self, dir: Direction, distance: f64) -> Position {
        Position {
            x: self.x + dir.dx() * distance,
            y: self.y + dir.dy() * distance,
        }
    }
}

/// Heading in degrees, always normalized into `[0, 360)`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Direction(f64);

impl Direction {
    pub const EAST: Direction = Direction(0.0);
    pub const SOUTH: Direction = Direction(90.0);
    pub const WEST: Direction = Direction(180.0);
    pub const NORTH: Direction = Direction(270.0);

    pub fn new(degrees: f64) -> Self {
        Self(normalize(degrees))
    }

    pub fn from_angle(degrees: f64) -> Self {
        Self::new(degrees)
    }

    pub fn to_angle(&self) -> f64 {
        self.0
    }

    /// Unit vector x component.
    pub fn dx(&self) -> f64 {
        self.0.to_radians().cos()
    }

    /// Unit vector y component.
    pub fn dy(&self) -> f64 {
        self.0.to_radians().sin()
    }

    /// Rotate by `delta` degrees (positive is clockwise).
    pub fn turn(&self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }

    pub fn turn_back(&self) -> Self {
        self.turn(180.0)
    }

    /// Signed shortest rotation from `self` to `target`, in `(-180, 180]`.
    ///
    /// Headings exactly opposite each other resolve to `+180`, i.e. the turn
    /// goes clockwise.
    pub fn angle_to(&self, target: Direction) -> f64 {
        let diff = (target.0 - self.0).rem_euclid(360.0);
        if diff > 180.0 {
            diff - 360.0
        } else {
            diff
        }
    }

    /// Rotate at most `max_step` degrees toward `target` along the shorter arc.
    ///
    /// Lands exactly on `target` once the remaining gap fits in one step.
    pub fn turn_towards(&self, target: Direction, max_step: f64) -> Self {
        let max_step = max_step.max(0.0);
        let delta = self.angle_to(target);
        if delta.abs() <= max_step {
            target
        } else {
            self.turn(max_step.copysign(delta))
        }
    }
}

/// Map any finite angle into `[0, 360)`.
pub fn normalize(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}
