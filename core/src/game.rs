use bitflags::bitflags;
use core::ops::BitOr;
use core::time::Duration;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// Game progress. An empty set means the board is ready for the first click.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GameStatus: u8 {
        const STARTED = 1;
        const WON = 2;
        const LOST = 4;
    }
}

impl GameStatus {
    pub const READY: Self = Self::empty();
    pub const OVER: Self = Self::WON.union(Self::LOST);

    pub const fn is_ready(self) -> bool {
        self.is_empty()
    }

    pub const fn is_over(self) -> bool {
        self.intersects(Self::OVER)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Won, _) | (_, Won) => Won,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// One playable board with its status, fed by input events and frame ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub(crate) board: Board,
    pub(crate) status: GameStatus,
    hovered: Option<Coord2>,
}

impl Game {
    pub fn new(config: BoardConfig, seed: u64) -> Self {
        Self::with_rng(config, GameRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: BoardConfig, rng: GameRng) -> Self {
        Self {
            board: Board::new(config, rng),
            status: GameStatus::READY,
            hovered: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> BoardConfig {
        self.board.config()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn flags_left(&self) -> isize {
        self.board.flags_left()
    }

    pub fn is_settled(&self) -> bool {
        self.board.is_settled()
    }

    /// Reveals a tile. The first click of a game also generates the board around it.
    pub fn on_click(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_not_over()?;

        let tile = &self.board[coords];
        if !tile.is_hidden() || tile.is_flagged() {
            return Ok(RevealOutcome::NoChange);
        }

        if self.status.is_ready() {
            self.start_at(coords);
        } else if tile.is_mine() {
            self.status = GameStatus::STARTED | GameStatus::LOST;
            log::debug!("Lost at {:?}", coords);
            self.board.detonate(coords);
            return Ok(RevealOutcome::HitMine);
        } else {
            self.board.flip(coords, true, Duration::ZERO);
        }

        if self.board.has_won() {
            self.status |= GameStatus::WON;
            log::debug!("Won after revealing {} tiles", self.board.revealed_count());
            self.board.clear_mines();
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    fn start_at(&mut self, root: Coord2) {
        let budget = self.board.config().safe_budget;
        let area = SafeZoneGenerator::new(budget).generate(&mut self.board, root);
        self.board.reveal_starting_area(&area.reveal_order);
        self.status = GameStatus::STARTED;
        log::debug!("Started game at {:?}", root);
    }

    /// Toggles the flag on a hidden tile.
    ///
    /// Toggling again while the flag is still moving reverses it instead of starting over.
    pub fn on_alt_click(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_not_over()?;

        if !self.board[coords].is_hidden() {
            return Ok(MarkOutcome::NoChange);
        }

        let tile = self.board.tile_mut(coords);
        let flagging = !tile.is_flagged();
        tile.set_flagged(flagging);

        if let Some(Animation::Flag(anim)) = tile.slot.animation_mut() {
            anim.set_flagging(flagging);
        } else {
            tile.set_face(Face::HIDDEN);
            self.board
                .play_on(coords, FlagAnim::new(flagging), Duration::ZERO);
        }
        log::trace!("Flag at {:?} set to {}", coords, flagging);

        Ok(MarkOutcome::Changed)
    }

    /// Highlights a hidden tile under the pointer, or hurries its pending uncover.
    pub fn on_hover(&mut self, coords: Coord2) -> Result<bool> {
        let coords = self.board.validate_coords(coords)?;
        if self.status.is_over() {
            if let Some(previous) = self.hovered.take() {
                self.board.tile_mut(previous).unhighlight();
            }
            return Ok(false);
        }
        if let Some(previous) = self.hovered.replace(coords)
            && previous != coords
        {
            self.board.tile_mut(previous).unhighlight();
        }

        let now = self.board.now();
        let tile = self.board.tile_mut(coords);
        if tile.slot.is_anim_pending(AnimCode::Uncover) {
            return Ok(tile.slot.expedite(now));
        }
        Ok(tile.highlight())
    }

    pub fn on_leave(&mut self, coords: Coord2) -> Result<()> {
        let coords = self.board.validate_coords(coords)?;
        if self.hovered == Some(coords) {
            self.hovered = None;
        }
        self.board.tile_mut(coords).unhighlight();
        Ok(())
    }

    /// Advances every animation by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        self.board.update(dt);
    }

    pub fn render(&self, sink: &mut dyn RenderSink) {
        self.board.render(sink);
    }

    /// Back to a fresh board of the same size, ready for a first click.
    pub fn restart(&mut self) {
        log::debug!("Restarting {:?}", self.board.size());
        self.board.reset();
        self.status = GameStatus::READY;
        self.hovered = None;
    }

    pub fn set_config(&mut self, config: BoardConfig) {
        log::debug!("New board configuration {:?}", config);
        self.board.reconfigure(config);
        self.status = GameStatus::READY;
        self.hovered = None;
    }

    fn check_not_over(&self) -> Result<()> {
        if self.status.is_over() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(game: &mut Game) {
        for _ in 0..10_000 {
            if game.is_settled() {
                return;
            }
            game.update(1.0 / 60.0);
        }
        panic!("game never settled");
    }

    /// Started game with mines exactly at `mines` and nothing revealed.
    fn rigged(size: Coord2, mines: &[Coord2]) -> Game {
        let mut game = Game::new(BoardConfig::new(size, mines.len() as CellCount), 0);
        for &coords in mines {
            game.board.tile_mut(coords).set_mine(true);
        }
        game.status = GameStatus::STARTED;
        game
    }

    #[test]
    fn status_helpers() {
        assert!(GameStatus::READY.is_ready());
        assert!(!GameStatus::STARTED.is_over());
        assert!((GameStatus::STARTED | GameStatus::LOST).is_over());
        assert_eq!(GameStatus::OVER.bits(), 6);
    }

    #[test]
    fn outcomes_combine_by_severity() {
        use RevealOutcome::*;
        assert_eq!(NoChange | Revealed, Revealed);
        assert_eq!(Revealed | Won, Won);
        assert_eq!(Won | HitMine, HitMine);
        assert!(!NoChange.has_update());
    }

    #[test]
    fn tiny_board_first_click_wins() {
        let mut game = Game::new(BoardConfig::new((1, 3), 0), 1);

        assert_eq!(game.on_click((0, 0)), Ok(RevealOutcome::Won));
        settle(&mut game);

        assert!(game.status().contains(GameStatus::WON));
        for tile in game.board().tiles() {
            assert!(tile.is_revealed());
            assert_eq!(tile.touching(), 0);
            assert_eq!(tile.face(), Face::number(0, false));
        }
    }

    #[test]
    fn first_click_never_hits_a_mine() {
        for seed in 0..20 {
            let mut game = Game::new(BoardConfig::expert(), seed);
            let outcome = game.on_click((8, 15)).unwrap();

            assert_eq!(outcome, RevealOutcome::Revealed);
            assert_eq!(game.status(), GameStatus::STARTED);
            assert!(game.board()[(8, 15)].is_safe());
            assert_eq!(game.board().mine_count(), 99);
        }
    }

    #[test]
    fn hitting_a_mine_loses() {
        let mut game = rigged((2, 2), &[(0, 0)]);

        assert_eq!(game.on_click((0, 0)), Ok(RevealOutcome::HitMine));
        assert!(game.status().contains(GameStatus::LOST));
        assert_eq!(game.on_click((1, 1)), Err(GameError::AlreadyEnded));
        assert_eq!(game.on_alt_click((1, 1)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn winning_clears_mines() {
        let mut game = rigged((1, 3), &[(0, 2)]);

        assert_eq!(game.on_click((0, 0)), Ok(RevealOutcome::Won));
        settle(&mut game);

        assert!(game.board()[(0, 2)].is_removed());
        assert_eq!(game.board()[(0, 1)].face(), Face::number(1, false));
    }

    #[test]
    fn flagged_tiles_ignore_clicks() {
        let mut game = rigged((2, 2), &[(0, 0)]);

        assert_eq!(game.on_alt_click((0, 0)), Ok(MarkOutcome::Changed));
        assert_eq!(game.on_click((0, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(game.flags_left(), 0);
    }

    #[test]
    fn flag_overlay_appears_after_animation() {
        let mut game = rigged((2, 2), &[(0, 0)]);

        game.on_alt_click((1, 1)).unwrap();
        assert!(game.board()[(1, 1)].is_flagged());
        assert_eq!(game.board()[(1, 1)].face().overlay, None);

        settle(&mut game);
        assert_eq!(game.board()[(1, 1)].face().overlay, Some(TextureId::Flag));
    }

    #[test]
    fn second_toggle_reverses_flag_in_flight() {
        let mut game = rigged((2, 2), &[(0, 0)]);

        game.on_alt_click((1, 1)).unwrap();
        game.update(0.1);
        game.update(0.1);
        game.on_alt_click((1, 1)).unwrap();

        let slot = game.board()[(1, 1)].slot();
        match slot.animation() {
            Some(Animation::Flag(anim)) => assert!(!anim.is_flagging()),
            other => panic!("expected a flag animation, got {other:?}"),
        }

        settle(&mut game);
        assert!(!game.board()[(1, 1)].is_flagged());
        assert_eq!(game.board()[(1, 1)].face(), Face::HIDDEN);
    }

    #[test]
    fn revealed_tiles_cannot_be_flagged() {
        let mut game = rigged((1, 3), &[(0, 2)]);
        game.on_click((0, 0)).unwrap();
        assert_eq!(game.on_alt_click((0, 0)), Err(GameError::AlreadyEnded));

        let mut game = rigged((2, 3), &[(0, 2)]);
        game.on_click((1, 0)).unwrap();
        assert_eq!(game.on_alt_click((1, 0)), Ok(MarkOutcome::NoChange));
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut game = Game::new(BoardConfig::beginner(), 0);
        assert_eq!(game.on_click((9, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.on_hover((0, 9)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn hover_highlights_and_leave_clears() {
        let mut game = Game::new(BoardConfig::beginner(), 0);

        assert_eq!(game.on_hover((1, 1)), Ok(true));
        assert_eq!(
            game.board()[(1, 1)].face().background,
            Some(TextureId::Highlight)
        );

        game.on_hover((2, 2)).unwrap();
        assert_eq!(game.board()[(1, 1)].face(), Face::HIDDEN);

        game.on_leave((2, 2)).unwrap();
        assert_eq!(game.board()[(2, 2)].face(), Face::HIDDEN);
    }

    #[test]
    fn hover_expedites_pending_uncover() {
        let mut game = rigged((1, 6), &[]);
        game.board.flip((0, 0), true, Duration::ZERO);
        assert!(game.board()[(0, 5)].slot().is_anim_pending(AnimCode::Uncover));

        assert_eq!(game.on_hover((0, 5)), Ok(true));
        game.update(0.001);

        assert_eq!(game.board()[(0, 5)].face(), Face::number(0, false));
        assert!(game.board()[(0, 4)].slot().is_anim_pending(AnimCode::Uncover));
    }

    #[test]
    fn hover_does_nothing_once_over() {
        let mut game = rigged((1, 6), &[(0, 0)]);
        game.on_hover((0, 3)).unwrap();
        game.board.flip((0, 5), true, Duration::ZERO);
        assert!(game.board()[(0, 1)].slot().is_anim_pending(AnimCode::Uncover));

        assert_eq!(game.on_click((0, 0)), Ok(RevealOutcome::HitMine));

        assert_eq!(game.on_hover((0, 1)), Ok(false));
        assert!(game.board()[(0, 1)].slot().is_anim_pending(AnimCode::Uncover));
    }

    #[test]
    fn first_click_leaves_flagged_tiles_alone() {
        let mut game = Game::new(BoardConfig::new((3, 3), 0).with_safe_budget(8), 0);
        assert_eq!(game.on_alt_click((1, 1)), Ok(MarkOutcome::Changed));

        assert_eq!(game.on_click((0, 0)), Ok(RevealOutcome::Revealed));
        let tile = &game.board()[(1, 1)];
        assert!(tile.is_hidden());
        assert!(tile.is_flagged());
        assert_eq!(game.board().revealed_count(), 8);

        game.on_alt_click((1, 1)).unwrap();
        assert_eq!(game.on_click((1, 1)), Ok(RevealOutcome::Won));
        assert_eq!(game.flags_left(), 0);
    }

    #[test]
    fn restart_returns_to_ready() {
        let mut game = Game::new(BoardConfig::beginner(), 3);
        game.on_click((4, 4)).unwrap();
        game.update(0.2);

        game.restart();

        assert_eq!(game.status(), GameStatus::READY);
        assert!(game.is_settled());
        assert_eq!(game.board().revealed_count(), 0);
        assert_eq!(game.board().tiles().filter(|t| t.is_mine()).count(), 0);
    }

    #[test]
    fn set_config_resizes() {
        let mut game = Game::new(BoardConfig::beginner(), 3);
        game.on_click((0, 0)).unwrap();

        game.set_config(BoardConfig::intermediate());

        assert_eq!(game.board().size(), (16, 16));
        assert_eq!(game.status(), GameStatus::READY);
        assert!(game.on_click((15, 15)).unwrap().has_update());
    }

    #[test]
    fn same_seed_replays_same_game() {
        let play = |seed| {
            let mut game = Game::new(BoardConfig::intermediate(), seed);
            game.on_click((3, 3)).unwrap();
            game.board().tiles().map(Tile::bits).collect::<Vec<_>>()
        };
        assert_eq!(play(11), play(11));
    }
}
