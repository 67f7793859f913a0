//! Drawing contract between the simulation and a front-end.
//!
//! The simulation never touches pixels. After every tick the driver walks the
//! live objects and hands each one's routine a `DrawContext`; a front-end
//! implements that trait over its own canvas.

use crate::components::{Kind, MeteorStage};
use crate::geometry::{Direction, Position};
use crate::habitat::ObjectView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Abstract drawing surface. Coordinates are habitat coordinates.
pub trait DrawContext {
    /// Draw a named sprite centred on `at`, rotated to `heading`.
    fn draw_sprite(&mut self, sprite: &str, at: Position, heading: Direction, width: f64, height: f64);

    /// Fill an axis-aligned oval centred on `at`.
    fn fill_oval(&mut self, at: Position, width: f64, height: f64, color: Color);
}

/// Custom paint routine used instead of a sprite.
pub type Painter = fn(&mut dyn DrawContext, Position, f64, f64);

/// Visual tag shown next to a registered factory.
#[derive(Clone, Copy)]
pub enum Icon {
    Sprite(&'static str),
    Painter(Painter),
}

impl std::fmt::Debug for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Icon::Sprite(name) => f.debug_tuple("Sprite").field(name).finish(),
            Icon::Painter(_) => f.write_str("Painter(..)"),
        }
    }
}

/// Discards everything. Used for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCanvas;

impl DrawContext for NullCanvas {
    fn draw_sprite(&mut self, _: &str, _: Position, _: Direction, _: f64, _: f64) {}

    fn fill_oval(&mut self, _: Position, _: f64, _: f64, _: Color) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Sprite {
        sprite: String,
        at: Position,
        heading: Direction,
        width: f64,
        height: f64,
    },
    Oval {
        at: Position,
        width: f64,
        height: f64,
        color: Color,
    },
}

/// Keeps every call, for tests and debugging front-ends.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprites_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DrawCall> + 'a {
        self.calls
            .iter()
            .filter(move |c| matches!(c, DrawCall::Sprite { sprite, .. } if sprite == name))
    }
}

impl DrawContext for RecordingCanvas {
    fn draw_sprite(&mut self, sprite: &str, at: Position, heading: Direction, width: f64, height: f64) {
        self.calls.push(DrawCall::Sprite {
            sprite: sprite.to_string(),
            at,
            heading,
            width,
            height,
        });
    }

    fn fill_oval(&mut self, at: Position, width: f64, height: f64, color: Color) {
        self.calls.push(DrawCall::Oval {
            at,
            width,
            height,
            color,
        });
    }
}

const FEED_COLOR: Color = Color::rgb(90, 170, 60);
const REPELLANT_COLOR: Color = Color::rgb(200, 40, 40);
const REPELLANT_CORE: Color = Color::rgba(255, 220, 220, 200);

/// Paint routine for feed pellets.
pub fn paint_feed(ctx: &mut dyn DrawContext, at: Position, width: f64, height: f64) {
    ctx.fill_oval(at, width, height, FEED_COLOR);
}

/// Paint routine for repellants: a red disc with a pale core.
pub fn paint_repellant(ctx: &mut dyn DrawContext, at: Position, width: f64, height: f64) {
    ctx.fill_oval(at, width, height, REPELLANT_COLOR);
    ctx.fill_oval(at, width * 0.4, height * 0.4, REPELLANT_CORE);
}

pub fn sprite_for(kind: Kind) -> Option<&'static str> {
    match kind {
        Kind::Meteor(MeteorStage::Primary) => Some("meteor"),
        Kind::Meteor(MeteorStage::Fragment) => Some("meteor_fragment"),
        Kind::Animal => Some("animal"),
        Kind::Hunter => Some("hunter"),
        Kind::Prey => Some("prey"),
        Kind::Blob => Some("blob"),
        Kind::SilverStar => Some("silver_star"),
        Kind::Feed | Kind::Repellant => None,
    }
}

/// Draw one object.
pub fn draw_object(view: &ObjectView, ctx: &mut dyn DrawContext) {
    let (w, h) = (view.body.width(), view.body.height());
    match view.kind {
        Kind::Feed => paint_feed(ctx, view.position, w, h),
        Kind::Repellant => paint_repellant(ctx, view.position, w, h),
        kind => {
            if let Some(sprite) = sprite_for(kind) {
                ctx.draw_sprite(sprite, view.position, view.direction, w, h);
            }
        }
    }
}
