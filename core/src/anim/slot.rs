use core::time::Duration;
use smallvec::SmallVec;

use super::*;

/// Lifecycle notification emitted by an [`AnimationSlot`].
///
/// Every [`AnimationSlot::play`] eventually yields exactly one `Started` followed by exactly one `Finished`,
/// whether the animation runs to completion or is interrupted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Started(AnimCode),
    Finished(AnimCode),
}

/// At most one start/finish pair is ever produced by a single slot call.
pub type Notices = SmallVec<[Notice; 2]>;

#[derive(Clone, Debug, PartialEq)]
struct Active<A> {
    code: AnimCode,
    animation: A,
    start_at: Duration,
    started: bool,
}

/// Holds at most one animation for an entity and drives its delayed start.
///
/// Valid transitions:
/// - Idle -> Pending (`play`)
/// - Pending -> Running (`update` once `now >= start_at`)
/// - Pending | Running -> Idle (`kill`, or the animation finishing)
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSlot<A = Animation> {
    active: Option<Active<A>>,
}

impl<A> Default for AnimationSlot<A> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<A: Animate> AnimationSlot<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever is held with `animation`, to start `delay` after `now`.
    ///
    /// The returned notices belong to the replaced animation, if there was one.
    #[must_use]
    pub fn play(&mut self, now: Duration, code: AnimCode, animation: A, delay: Duration) -> Notices {
        let notices = self.kill();
        self.active = Some(Active {
            code,
            animation,
            start_at: now + delay,
            started: false,
        });
        notices
    }

    /// Advances the slot to `now`, stepping a running animation by `dt` seconds.
    #[must_use]
    pub fn update(&mut self, now: Duration, dt: f64, rng: &mut GameRng) -> Notices {
        let Some(active) = self.active.as_mut() else {
            return Notices::new();
        };

        if !active.started {
            if now >= active.start_at {
                active.started = true;
                active.animation.on_start(rng);
                return Notices::from_elem(Notice::Started(active.code), 1);
            }
            Notices::new()
        } else if !active.animation.on_update(dt, rng) {
            self.kill()
        } else {
            Notices::new()
        }
    }

    /// Drops the held animation, emitting whatever notices it still owes.
    #[must_use]
    pub fn kill(&mut self) -> Notices {
        let mut notices = Notices::new();
        if let Some(active) = self.active.take() {
            if !active.started {
                notices.push(Notice::Started(active.code));
            }
            notices.push(Notice::Finished(active.code));
        }
        notices
    }

    /// Moves a pending start forward to `now`. Returns whether anything changed.
    pub fn expedite(&mut self, now: Duration) -> bool {
        match self.active.as_mut() {
            Some(active) if !active.started && active.start_at > now => {
                active.start_at = now;
                true
            }
            _ => false,
        }
    }
}

impl<A> AnimationSlot<A> {
    /// Whether an animation with `code` is held, pending or running.
    pub fn is_anim_active(&self, code: AnimCode) -> bool {
        self.code() == Some(code)
    }

    pub fn is_any_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether an animation with `code` is held but has not started yet.
    pub fn is_anim_pending(&self, code: AnimCode) -> bool {
        matches!(&self.active, Some(active) if active.code == code && !active.started)
    }

    pub fn code(&self) -> Option<AnimCode> {
        self.active.as_ref().map(|active| active.code)
    }

    pub fn start_at(&self) -> Option<Duration> {
        self.active.as_ref().map(|active| active.start_at)
    }

    pub fn animation(&self) -> Option<&A> {
        self.active.as_ref().map(|active| &active.animation)
    }

    pub fn animation_mut(&mut self) -> Option<&mut A> {
        self.active.as_mut().map(|active| &mut active.animation)
    }

    /// The held animation, only once it has started.
    pub fn running(&self) -> Option<&A> {
        self.active
            .as_ref()
            .filter(|active| active.started)
            .map(|active| &active.animation)
    }
}
