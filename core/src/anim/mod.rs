use crate::*;
pub use detonation::*;
pub use fade::*;
pub use flag::*;
pub use slot::*;
pub use uncover::*;

mod detonation;
mod fade;
mod flag;
mod slot;
mod uncover;

/// Logical kind of an animation, used by slots for idempotency checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnimCode {
    Flag,
    Uncover,
    RevealMine,
    WinTile,
    Detonation,
}

/// Contract every effect driven by an [`AnimationSlot`] follows.
pub trait Animate {
    /// Called exactly once, on the frame the start delay elapses.
    fn on_start(&mut self, rng: &mut GameRng);

    /// Advances by `dt` seconds. Returning `false` ends the animation.
    fn on_update(&mut self, dt: f64, rng: &mut GameRng) -> bool;
}

/// Closed set of effects the game plays.
#[derive(Clone, Debug, PartialEq)]
pub enum Animation {
    Flag(FlagAnim),
    Uncover(UncoverAnim),
    MineReveal(MineRevealAnim),
    Detonation(DetonationAnim),
    WinTile(WinTileAnim),
}

impl Animation {
    pub const fn code(&self) -> AnimCode {
        match self {
            Self::Flag(_) => AnimCode::Flag,
            Self::Uncover(_) => AnimCode::Uncover,
            Self::MineReveal(_) => AnimCode::RevealMine,
            Self::Detonation(_) => AnimCode::Detonation,
            Self::WinTile(_) => AnimCode::WinTile,
        }
    }

    /// Draws a running animation. Tile effects are placed in `rect`, the detonation uses screen coordinates.
    pub fn render(&self, rect: Rect, sink: &mut dyn RenderSink) {
        match self {
            Self::Flag(anim) => anim.render(rect, sink),
            Self::Uncover(anim) => anim.render(rect, sink),
            Self::MineReveal(anim) => anim.render(rect, sink),
            Self::Detonation(anim) => anim.render(sink),
            Self::WinTile(anim) => anim.render(rect, sink),
        }
    }
}

impl Animate for Animation {
    fn on_start(&mut self, rng: &mut GameRng) {
        match self {
            Self::Flag(anim) => anim.on_start(rng),
            Self::Uncover(anim) => anim.on_start(rng),
            Self::MineReveal(anim) => anim.on_start(rng),
            Self::Detonation(anim) => anim.on_start(rng),
            Self::WinTile(anim) => anim.on_start(rng),
        }
    }

    fn on_update(&mut self, dt: f64, rng: &mut GameRng) -> bool {
        match self {
            Self::Flag(anim) => anim.on_update(dt, rng),
            Self::Uncover(anim) => anim.on_update(dt, rng),
            Self::MineReveal(anim) => anim.on_update(dt, rng),
            Self::Detonation(anim) => anim.on_update(dt, rng),
            Self::WinTile(anim) => anim.on_update(dt, rng),
        }
    }
}

impl From<FlagAnim> for Animation {
    fn from(anim: FlagAnim) -> Self {
        Self::Flag(anim)
    }
}

impl From<UncoverAnim> for Animation {
    fn from(anim: UncoverAnim) -> Self {
        Self::Uncover(anim)
    }
}

impl From<MineRevealAnim> for Animation {
    fn from(anim: MineRevealAnim) -> Self {
        Self::MineReveal(anim)
    }
}

impl From<DetonationAnim> for Animation {
    fn from(anim: DetonationAnim) -> Self {
        Self::Detonation(anim)
    }
}

impl From<WinTileAnim> for Animation {
    fn from(anim: WinTileAnim) -> Self {
        Self::WinTile(anim)
    }
}
