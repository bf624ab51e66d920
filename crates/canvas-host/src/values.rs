//! Engine-side value types that cross the host boundary.
//!
//! Layouts follow the host engine: colors are float RGBA in `0.0..=1.0`,
//! rectangles are position + size, and 2D transforms are column vectors
//! `x`, `y` plus an `origin`.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl HostColor {
    pub const WHITE: HostColor = HostColor::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: HostColor = HostColor::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: HostColor = HostColor::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect2 {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect2 {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub x: Vec2,
    pub y: Vec2,
    pub origin: Vec2,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        x: Vec2::new(1.0, 0.0),
        y: Vec2::new(0.0, 1.0),
        origin: Vec2::ZERO,
    };
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}
