use serde::{Deserialize, Serialize};

pub use anim::*;
pub use board::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use render::*;
pub use reveal::*;
pub use save::*;
pub use tile::*;
pub use types::*;

mod anim;
mod board;
mod error;
mod game;
mod generator;
mod render;
mod reveal;
mod save;
mod tile;
mod types;

/// Random stream shared by board generation and effects. Seed it to replay a game exactly.
pub type GameRng = rand_pcg::Pcg32;

/// Largest supported row or column count.
pub const MAX_DIM: Coord = 32;

/// Tiles carved out around the first click, not counting the clicked tile.
pub const DEFAULT_SAFE_BUDGET: CellCount = 20;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// `(rows, cols)`
    pub size: Coord2,
    pub mines: CellCount,
    pub safe_budget: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self {
            size,
            mines,
            safe_budget: DEFAULT_SAFE_BUDGET,
        }
    }

    pub fn new((rows, cols): Coord2, mines: CellCount) -> Self {
        let rows = rows.clamp(1, MAX_DIM);
        let cols = cols.clamp(1, MAX_DIM);
        let mines = mines.min(mult(rows, cols));
        Self::new_unchecked((rows, cols), mines)
    }

    /// Like [`BoardConfig::new`], but refuses a board without rows or columns instead of growing it.
    pub fn try_new(size: Coord2, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::EmptyBoard);
        }
        Ok(Self::new(size, mines))
    }

    pub const fn with_safe_budget(mut self, safe_budget: CellCount) -> Self {
        self.safe_budget = safe_budget;
        self
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((16, 30), 99)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::beginner()
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
    Custom(BoardConfig),
}

impl Difficulty {
    pub fn config(self) -> BoardConfig {
        match self {
            Self::Beginner => BoardConfig::beginner(),
            Self::Intermediate => BoardConfig::intermediate(),
            Self::Expert => BoardConfig::expert(),
            Self::Custom(config) => BoardConfig::new(config.size, config.mines)
                .with_safe_budget(config.safe_budget),
        }
    }
}
