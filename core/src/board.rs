use core::ops::Index;
use core::time::Duration;
use ndarray::Array2;

use crate::*;

/// Grid of tiles plus everything that animates on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    config: BoardConfig,
    tiles: Array2<Tile>,
    mine_count: CellCount,
    pub(crate) rng: GameRng,
    clock: Duration,
    layout: Layout,
    /// Board-wide effects that are not bound to a tile, like the detonation.
    pub(crate) effects: AnimationSlot,
    /// Mine whose reveal start triggers the incorrect-flag pass.
    pub(crate) misflag_watch: Option<Coord2>,
}

fn build_tiles((rows, cols): Coord2) -> Array2<Tile> {
    Array2::from_shape_fn((rows.into(), cols.into()), |(row, col)| {
        Tile::new((row as Coord, col as Coord))
    })
}

impl Board {
    pub fn new(config: BoardConfig, rng: GameRng) -> Self {
        Self {
            config,
            tiles: build_tiles(config.size),
            mine_count: config.mines,
            rng,
            clock: Duration::ZERO,
            layout: Layout::default(),
            effects: AnimationSlot::new(),
            misflag_watch: None,
        }
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    /// Mines actually on the board, which may be fewer than configured when they did not fit.
    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub(crate) fn set_mine_count(&mut self, mine_count: CellCount) {
        self.mine_count = mine_count;
    }

    /// Absolute animation time.
    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.size();
        if coords.0 < rows && coords.1 < cols {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<&Tile> {
        self.tiles.get(coords.to_nd_index())
    }

    pub(crate) fn tile_mut(&mut self, coords: Coord2) -> &mut Tile {
        &mut self.tiles[coords.to_nd_index()]
    }

    /// Tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.tiles.iter_neighbors(coords)
    }

    pub fn iter_cardinal(&self, coords: Coord2) -> NeighborIter {
        self.tiles.iter_cardinal(coords)
    }

    pub fn touching_mines(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self[pos].is_mine())
            .count() as u8
    }

    pub fn flagged_count(&self) -> CellCount {
        self.tiles.iter().filter(|tile| tile.is_flagged()).count() as CellCount
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    pub fn flags_left(&self) -> isize {
        (self.mine_count as isize) - (self.flagged_count() as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.tiles.iter().filter(|tile| tile.is_revealed()).count() as CellCount
    }

    /// Every non-mine tile has been revealed.
    pub fn has_won(&self) -> bool {
        self.tiles
            .iter()
            .all(|tile| tile.is_mine() || tile.is_revealed())
    }

    /// No animation is pending or running anywhere.
    pub fn is_settled(&self) -> bool {
        !self.effects.is_any_active() && self.tiles.iter().all(|tile| !tile.slot.is_any_active())
    }

    /// Plays `animation` on a tile, routing whatever the replaced animation still owed.
    pub(crate) fn play_on(&mut self, coords: Coord2, animation: impl Into<Animation>, delay: Duration) {
        let animation = animation.into();
        let code = animation.code();
        let now = self.clock;
        let notices = self.tile_mut(coords).slot.play(now, code, animation, delay);
        self.dispatch(coords, notices);
    }

    pub(crate) fn kill_on(&mut self, coords: Coord2) {
        let notices = self.tile_mut(coords).slot.kill();
        self.dispatch(coords, notices);
    }

    pub(crate) fn dispatch(&mut self, coords: Coord2, notices: Notices) {
        for notice in notices {
            self.tile_mut(coords).handle(notice);
            if notice == Notice::Started(AnimCode::RevealMine) && self.misflag_watch == Some(coords) {
                self.misflag_watch = None;
                self.mark_misflags();
            }
        }
    }

    /// Marks every flagged safe tile red.
    pub(crate) fn mark_misflags(&mut self) {
        log::debug!("Marking incorrect flags");
        for tile in self.tiles.iter_mut() {
            if tile.is_safe() && tile.is_flagged() {
                tile.mark_red();
            }
        }
    }

    /// Kills every animation and returns all tiles to their initial state.
    pub fn reset(&mut self) {
        self.misflag_watch = None;
        let _ = self.effects.kill();
        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                self.kill_on((row, col));
                self.tile_mut((row, col)).reset();
            }
        }
        self.mine_count = self.config.mines;
    }

    /// Rebuilds the grid for a new configuration, keeping the random stream.
    pub fn reconfigure(&mut self, config: BoardConfig) {
        self.reset();
        self.config = config;
        self.tiles = build_tiles(config.size);
        self.mine_count = config.mines;
    }

    /// Advances the clock by `dt` seconds and updates every slot once, tiles first in row-major order.
    pub fn update(&mut self, dt: f64) {
        let dt = dt.max(0.0);
        self.clock += Duration::try_from_secs_f64(dt).unwrap_or(Duration::ZERO);
        let now = self.clock;

        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                let notices = self.tiles[coords.to_nd_index()]
                    .slot
                    .update(now, dt, &mut self.rng);
                self.dispatch(coords, notices);
            }
        }

        let _ = self.effects.update(now, dt, &mut self.rng);
    }

    /// Recomputes cached counts and faces after tile bits were rewritten wholesale.
    pub(crate) fn settle_faces(&mut self) {
        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                let touching = self.touching_mines((row, col));
                let tile = self.tile_mut((row, col));
                tile.set_touching(touching);
                tile.set_face(tile.settled_face());
            }
        }
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        for tile in self.tiles.iter() {
            let rect = self.layout.tile_rect(tile.coords());
            let face = tile.face();
            if let Some(background) = face.background {
                sink.draw(&Sprite::at(background, rect));
            }
            if let Some(overlay) = face.overlay {
                sink.draw(&Sprite::at(overlay, rect));
            }
            if let Some(animation) = tile.slot.running() {
                animation.render(rect, sink);
            }
        }

        if let Some(animation) = self.effects.running() {
            animation.render(self.layout.field_rect(self.size()), sink);
        }
    }
}

impl Index<Coord2> for Board {
    type Output = Tile;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.tiles[coords.to_nd_index()]
    }
}
