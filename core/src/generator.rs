use hashbrown::HashSet;
use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::SmallVec;

use crate::*;

/// Most tiles carved out of the frontier per layer.
const LAYER_PICK: usize = 8;

/// Result of preparing a board on the first click.
#[derive(Clone, Debug, PartialEq)]
pub struct StartingArea {
    /// Carved tiles in discovery order, the clicked tile first.
    pub reveal_order: Vec<Coord2>,
    pub mines_placed: CellCount,
}

pub trait BoardGenerator {
    fn generate(self, board: &mut Board, root: Coord2) -> StartingArea;
}

/// Grows a random safe zone around the first click, then scatters mines outside it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SafeZoneGenerator {
    budget: CellCount,
}

impl SafeZoneGenerator {
    pub fn new(budget: CellCount) -> Self {
        Self { budget }
    }
}

impl BoardGenerator for SafeZoneGenerator {
    fn generate(self, board: &mut Board, root: Coord2) -> StartingArea {
        let reveal_order = board.carve_safe_zone(root, self.budget);
        let mines_placed = board.place_mines(board.config().mines);
        log::debug!(
            "Generated board around {:?}: {} safe tiles, {} mines",
            root,
            reveal_order.len(),
            mines_placed
        );
        StartingArea {
            reveal_order,
            mines_placed,
        }
    }
}

impl Board {
    /// Reveals `root` and up to `budget` more tiles around it, without animation.
    ///
    /// The first layer may use any of the 8 neighbors of `root`, later layers only grow through edges. Flagged
    /// tiles are never carved.
    pub fn carve_safe_zone(&mut self, root: Coord2, budget: CellCount) -> Vec<Coord2> {
        {
            let tile = self.tile_mut(root);
            tile.set_hidden(false);
            tile.set_mine(false);
        }
        let mut reveal_order = vec![root];
        let mut budget = usize::from(budget);

        let mut frontier: Vec<Coord2> = self
            .iter_neighbors(root)
            .filter(|&pos| self[pos].is_hidden() && !self[pos].is_flagged())
            .collect();

        while budget > 0 && !frontier.is_empty() {
            frontier.shuffle(&mut self.rng);
            let take = frontier.len().min(LAYER_PICK).min(budget);
            let picked: SmallVec<[Coord2; LAYER_PICK]> = frontier.drain(..take).collect();

            for &coords in &picked {
                self.tile_mut(coords).set_hidden(false);
                reveal_order.push(coords);
                log::trace!("Carved {:?} into the safe zone", coords);
            }
            budget -= picked.len();

            let mut seen = HashSet::new();
            frontier.clear();
            for &coords in &picked {
                for pos in self.iter_cardinal(coords) {
                    if self[pos].is_hidden() && !self[pos].is_flagged() && seen.insert(pos) {
                        frontier.push(pos);
                    }
                }
            }
        }

        reveal_order
    }

    /// Places up to `count` mines on hidden tiles and returns how many fit.
    ///
    /// Each mine starts at a random cell and scans forward in row-major order, wrapping around, until it finds a
    /// free hidden tile.
    pub fn place_mines(&mut self, count: CellCount) -> CellCount {
        let (rows, cols) = self.size();
        let total = usize::from(rows) * usize::from(cols);
        let mut placed: CellCount = 0;

        for _ in 0..count {
            let start_row = self.rng.random_range(0..rows);
            let start_col = self.rng.random_range(0..cols);
            let start = usize::from(start_row) * usize::from(cols) + usize::from(start_col);

            let free = (0..total)
                .map(|offset| (start + offset) % total)
                .map(|index| ((index / usize::from(cols)) as Coord, (index % usize::from(cols)) as Coord))
                .find(|&pos| self[pos].is_hidden() && !self[pos].is_mine());

            match free {
                Some(pos) => {
                    self.tile_mut(pos).set_mine(true);
                    placed += 1;
                }
                None => {
                    log::warn!(
                        "Board is full, placed {} of {} requested mines",
                        placed,
                        count
                    );
                    break;
                }
            }
        }

        self.set_mine_count(placed);
        placed
    }
}
