use rand::Rng;

use super::*;

/// Seconds an uncover wipe takes.
pub const UNCOVER_SECS: f64 = 1.0;

/// Edge the wipe starts from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wipe {
    FromRight,
    FromLeft,
    FromBottom,
    FromTop,
}

impl Wipe {
    /// Maps a uniform sample in `[0, 1)` onto one of the four directions.
    pub fn from_sample(sample: f64) -> Self {
        if sample < 0.25 {
            Self::FromRight
        } else if sample < 0.5 {
            Self::FromLeft
        } else if sample < 0.75 {
            Self::FromBottom
        } else {
            Self::FromTop
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::FromRight | Self::FromLeft)
    }
}

/// Wipes the hidden-tile cover away, exposing the face underneath.
#[derive(Clone, Debug, PartialEq)]
pub struct UncoverAnim {
    wipe: Option<Wipe>,
    remaining: f64,
}

impl Default for UncoverAnim {
    fn default() -> Self {
        Self::new()
    }
}

impl UncoverAnim {
    pub fn new() -> Self {
        Self {
            wipe: None,
            remaining: 1.0,
        }
    }

    /// Direction chosen on start, `None` while still pending.
    pub fn wipe(&self) -> Option<Wipe> {
        self.wipe
    }

    /// Fraction of the cover still visible.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Still-covered part of a tile of `size`, in tile-local coordinates.
    pub fn cover_rect(&self, size: f32) -> Rect {
        let left = self.remaining.max(0.0) as f32 * size;
        let gone = size - left;
        match self.wipe {
            None => Rect::new(0.0, 0.0, size, size),
            Some(Wipe::FromRight) => Rect::new(0.0, 0.0, left, size),
            Some(Wipe::FromLeft) => Rect::new(gone, 0.0, left, size),
            Some(Wipe::FromBottom) => Rect::new(0.0, 0.0, size, left),
            Some(Wipe::FromTop) => Rect::new(0.0, gone, size, left),
        }
    }

    pub fn render(&self, rect: Rect, sink: &mut dyn RenderSink) {
        let clip = self.cover_rect(rect.w);
        let sprite = Sprite::new(TextureId::Hidden, rect.x + clip.x, rect.y + clip.y, rect.w);
        sink.draw(&sprite.clipped(clip));
    }
}

impl Animate for UncoverAnim {
    fn on_start(&mut self, rng: &mut GameRng) {
        self.wipe = Some(Wipe::from_sample(rng.random::<f64>()));
    }

    fn on_update(&mut self, dt: f64, _rng: &mut GameRng) -> bool {
        self.remaining -= dt / UNCOVER_SECS;
        self.remaining >= 0.0
    }
}
