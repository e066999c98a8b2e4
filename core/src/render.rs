//! Drawing vocabulary shared by tiles and animations.
//!
//! Nothing here touches a graphics backend: the game describes what to draw through a [`RenderSink`]
//! and the frontend decides how.

use crate::*;

/// Every image the game can ask the frontend to draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureId {
    BlankSquare,
    Hidden,
    Highlight,
    RedSquare,
    Flag,
    Mine,
    /// Touching-mine count, always in `1..=8`.
    Number(u8),
    DetonationParticle,
    /// Solid fill used by fades.
    Fill(Tint),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tint {
    Red,
    Green,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
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

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Rotation in degrees around a pivot given relative to the sprite origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rotation {
    pub degrees: f32,
    pub pivot: Point,
}

/// One draw request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sprite {
    pub texture: TextureId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub rotation: Option<Rotation>,
    /// Portion of the texture to draw, in texture-local pixels.
    pub clip: Option<Rect>,
    pub alpha: f32,
}

impl Sprite {
    pub const fn new(texture: TextureId, x: f32, y: f32, size: f32) -> Self {
        Self {
            texture,
            x,
            y,
            size,
            rotation: None,
            clip: None,
            alpha: 1.0,
        }
    }

    pub const fn at(texture: TextureId, rect: Rect) -> Self {
        Self::new(texture, rect.x, rect.y, rect.w)
    }

    pub const fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub const fn clipped(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }

    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Frontend collaborator that performs the actual drawing.
pub trait RenderSink {
    fn draw(&mut self, sprite: &Sprite);

    /// Filled polygon, used for detonation fragments. Frontends without polygon support may ignore it.
    fn fill_polygon(&mut self, points: &[Point], alpha: f32) {
        let _ = (points, alpha);
    }
}

/// Screen placement of the board.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Layout {
    pub origin: Point,
    pub tile_size: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            origin: Point::default(),
            tile_size: 32.0,
        }
    }
}

impl Layout {
    pub fn tile_rect(&self, (row, col): Coord2) -> Rect {
        Rect::new(
            self.origin.x + f32::from(col) * self.tile_size,
            self.origin.y + f32::from(row) * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    pub fn field_rect(&self, (rows, cols): Coord2) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            f32::from(cols) * self.tile_size,
            f32::from(rows) * self.tile_size,
        )
    }

    /// Resolves a screen position to the tile under it, if any.
    pub fn tile_at(&self, size: Coord2, point: Point) -> Option<Coord2> {
        let col = ((point.x - self.origin.x) / self.tile_size).floor();
        let row = ((point.y - self.origin.y) / self.tile_size).floor();
        if row < 0.0 || col < 0.0 || row >= f32::from(size.0) || col >= f32::from(size.1) {
            return None;
        }
        Some((row as Coord, col as Coord))
    }
}
