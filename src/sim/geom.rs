//! Axis-aligned rectangle geometry
//!
//! Screen space: origin top-left, y grows downward. Positions are real-valued
//! so diagonal motion stays smooth.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Axis-aligned bounding rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on a point
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    /// The visible play area
    pub const fn screen() -> Self {
        Self::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn set_center_x(&mut self, cx: f32) {
        self.x = cx - self.w / 2.0;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Overlap test; rectangles sharing only an edge do not collide
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Move inside `bounds` (no-op on an axis where self is larger)
    pub fn clamp_within(&mut self, bounds: &Rect) {
        if self.w <= bounds.w {
            self.x = self.x.clamp(bounds.left(), bounds.right() - self.w);
        }
        if self.h <= bounds.h {
            self.y = self.y.clamp(bounds.top(), bounds.bottom() - self.h);
        }
    }

    pub fn is_within(&self, bounds: &Rect) -> bool {
        self.left() >= bounds.left()
            && self.right() <= bounds.right()
            && self.top() >= bounds.top()
            && self.bottom() <= bounds.bottom()
    }

    /// A uniformly chosen point inside the rectangle, given unit fractions
    pub fn lerp_point(&self, fx: f32, fy: f32) -> Vec2 {
        Vec2::new(self.x + self.w * fx, self.y + self.h * fy)
    }
}

/// Anything with a bounding rectangle
pub trait Body {
    fn rect(&self) -> Rect;

    fn center(&self) -> Vec2 {
        self.rect().center()
    }

    fn hits(&self, other: &Rect) -> bool {
        self.rect().intersects(other)
    }

    /// Fully below the visible area (downward travel)
    fn below_screen(&self) -> bool {
        self.rect().top() > SCREEN_HEIGHT
    }

    /// Fully above the visible area (upward travel)
    fn above_screen(&self) -> bool {
        self.rect().bottom() < 0.0
    }
}
