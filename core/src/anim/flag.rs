use super::*;

/// Angle the flag rests at when it is lowered.
pub const FLAG_START_DEGREES: f64 = 120.0;
/// Angular speed of the flag, in degrees per second.
pub const FLAG_DEGREES_PER_SEC: f64 = 270.0;

// Base of the flag pole, relative to the icon size.
const PIVOT_X: f32 = 18.0 / 64.0;
const PIVOT_Y: f32 = 57.0 / 64.0;

/// Raises or lowers the flag icon around the base of its pole.
#[derive(Clone, Debug, PartialEq)]
pub struct FlagAnim {
    flagging: bool,
    angle: f64,
}

impl FlagAnim {
    pub fn new(flagging: bool) -> Self {
        Self {
            flagging,
            angle: if flagging { FLAG_START_DEGREES } else { 0.0 },
        }
    }

    /// Reverses direction mid-flight when the tile is toggled again.
    pub fn set_flagging(&mut self, flagging: bool) {
        self.flagging = flagging;
    }

    pub fn is_flagging(&self) -> bool {
        self.flagging
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn render(&self, rect: Rect, sink: &mut dyn RenderSink) {
        let rotation = Rotation {
            degrees: self.angle as f32,
            pivot: Point::new(PIVOT_X * rect.w, PIVOT_Y * rect.h),
        };
        sink.draw(&Sprite::at(TextureId::Flag, rect).rotated(rotation));
    }
}

impl Animate for FlagAnim {
    fn on_start(&mut self, _rng: &mut GameRng) {
        self.angle = if self.flagging {
            FLAG_START_DEGREES
        } else {
            0.0
        };
    }

    fn on_update(&mut self, dt: f64, _rng: &mut GameRng) -> bool {
        if !(0.0..=FLAG_START_DEGREES).contains(&self.angle) {
            return false;
        }
        if self.flagging {
            self.angle -= FLAG_DEGREES_PER_SEC * dt;
        } else {
            self.angle += FLAG_DEGREES_PER_SEC * dt;
        }
        true
    }
}
