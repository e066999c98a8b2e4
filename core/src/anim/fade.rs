use super::*;

/// Alpha lost per second by the red overlay on a revealed mine.
pub const MINE_FADE_PER_SEC: f64 = 1.5;
/// Alpha below which the mine overlay is gone.
pub const MINE_FADE_FLOOR: f64 = 0.3;
/// Alpha lost per second by a cleared tile after a win.
pub const WIN_FADE_PER_SEC: f64 = 0.5;

/// Red flash over a mine that fades down to a floor.
#[derive(Clone, Debug, PartialEq)]
pub struct MineRevealAnim {
    alpha: f64,
}

impl Default for MineRevealAnim {
    fn default() -> Self {
        Self::new()
    }
}

impl MineRevealAnim {
    pub fn new() -> Self {
        Self { alpha: 1.0 }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn render(&self, rect: Rect, sink: &mut dyn RenderSink) {
        sink.draw(&Sprite::at(TextureId::Fill(Tint::Red), rect).with_alpha(self.alpha as f32));
    }
}

impl Animate for MineRevealAnim {
    fn on_start(&mut self, _rng: &mut GameRng) {
        self.alpha = 1.0;
    }

    fn on_update(&mut self, dt: f64, _rng: &mut GameRng) -> bool {
        self.alpha -= MINE_FADE_PER_SEC * dt;
        self.alpha >= MINE_FADE_FLOOR
    }
}

/// Green square fading out where a mine used to be.
#[derive(Clone, Debug, PartialEq)]
pub struct WinTileAnim {
    alpha: f64,
}

impl Default for WinTileAnim {
    fn default() -> Self {
        Self::new()
    }
}

impl WinTileAnim {
    pub fn new() -> Self {
        Self { alpha: 1.0 }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn render(&self, rect: Rect, sink: &mut dyn RenderSink) {
        sink.draw(&Sprite::at(TextureId::Fill(Tint::Green), rect).with_alpha(self.alpha as f32));
    }
}

impl Animate for WinTileAnim {
    fn on_start(&mut self, _rng: &mut GameRng) {}

    fn on_update(&mut self, dt: f64, _rng: &mut GameRng) -> bool {
        self.alpha -= WIN_FADE_PER_SEC * dt;
        self.alpha > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn mine_overlay_stops_at_floor() {
        let mut rng = GameRng::seed_from_u64(0);
        let mut anim = MineRevealAnim::new();
        anim.on_start(&mut rng);
        while anim.on_update(0.05, &mut rng) {
            assert!(anim.alpha() >= MINE_FADE_FLOOR);
        }
        assert!(anim.alpha() < MINE_FADE_FLOOR);
        assert!(anim.alpha() > MINE_FADE_FLOOR - MINE_FADE_PER_SEC * 0.05 - 1e-9);
    }

    #[test]
    fn win_fade_takes_two_seconds() {
        let mut rng = GameRng::seed_from_u64(0);
        let mut anim = WinTileAnim::new();
        anim.on_start(&mut rng);
        let frames = (0..100).take_while(|_| anim.on_update(0.5, &mut rng)).count();
        assert_eq!(frames, 3);
        assert!(anim.alpha() <= 0.0);
    }
}
