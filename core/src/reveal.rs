use core::time::Duration;
use smallvec::SmallVec;

use crate::*;

/// Extra delay per tile as a cascade ripples outward.
pub const CASCADE_STEP: Duration = Duration::from_millis(100);
/// Extra delay per tile while revealing the starting area.
pub const STARTING_AREA_STEP: Duration = Duration::from_millis(100);
/// Time over which the remaining mines are revealed after a loss.
pub const LOSS_REVEAL_TOTAL: Duration = Duration::from_secs(5);

/// One pending level of a depth-first cascade.
struct Frame {
    neighbors: SmallVec<[Coord2; 8]>,
    next: usize,
    delay: Duration,
}

impl Board {
    /// Reveals a tile with an animation starting `delay` from now.
    ///
    /// With `recurse`, a tile touching no mines also flips its hidden, unflagged neighbors depth-first, each one
    /// [`CASCADE_STEP`] later than the previous flip made from the same tile. Returns how many tiles were flipped.
    pub fn flip(&mut self, coords: Coord2, recurse: bool, delay: Duration) -> usize {
        let mut flipped = 1;
        if !self.flip_single(coords, delay) || !recurse {
            return flipped;
        }

        let mut stack = vec![Frame {
            neighbors: self.iter_neighbors(coords).collect(),
            next: 0,
            delay,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&pos) = frame.neighbors.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;

            let tile = &self[pos];
            if !tile.is_hidden() || tile.is_flagged() {
                continue;
            }

            frame.delay += CASCADE_STEP;
            let delay = frame.delay;
            flipped += 1;
            if self.flip_single(pos, delay) {
                stack.push(Frame {
                    neighbors: self.iter_neighbors(pos).collect(),
                    next: 0,
                    delay,
                });
            }
        }

        flipped
    }

    /// Reveals one tile. Returns whether it is a safe tile touching no mines.
    fn flip_single(&mut self, coords: Coord2, delay: Duration) -> bool {
        let touching = self.touching_mines(coords);
        let tile = self.tile_mut(coords);
        tile.set_hidden(false);

        if tile.is_mine() {
            tile.set_face(Face {
                overlay: None,
                ..tile.face()
            });
            log::trace!("Flip mine at {:?}, delay {:?}", coords, delay);
            self.play_on(coords, MineRevealAnim::new(), delay);
            false
        } else {
            tile.set_touching(touching);
            log::trace!("Flip {:?} touching {}, delay {:?}", coords, touching, delay);
            self.play_on(coords, UncoverAnim::new(), delay);
            touching == 0
        }
    }

    /// Flips every carved tile in discovery order, each [`STARTING_AREA_STEP`] after the previous one.
    pub fn reveal_starting_area(&mut self, reveal_order: &[Coord2]) {
        let mut delay = Duration::ZERO;
        for &coords in reveal_order {
            self.flip(coords, true, delay);
            delay += STARTING_AREA_STEP;
        }
    }

    /// Plays the loss sequence around the detonated mine.
    ///
    /// Remaining unflagged mines are revealed nearest first, spread over [`LOSS_REVEAL_TOTAL`]. Incorrect flags turn
    /// red once the last of those reveals starts. Returns the scheduled reveals.
    pub fn detonate(&mut self, mine: Coord2) -> Vec<(Coord2, Duration)> {
        self.kill_on(mine);
        {
            let tile = self.tile_mut(mine);
            tile.set_hidden(false);
            tile.mark_red();
            tile.set_face(Face::mine(true));
        }

        let center = self.layout().tile_rect(mine).center();
        let field = self.layout().field_rect(self.size());
        let now = self.now();
        let _ = self.effects.play(
            now,
            AnimCode::Detonation,
            DetonationAnim::new(center, field).into(),
            Duration::ZERO,
        );

        let mut mines: Vec<Coord2> = self
            .tiles()
            .filter(|tile| tile.is_mine() && tile.is_hidden() && !tile.is_flagged())
            .map(Tile::coords)
            .filter(|&coords| coords != mine)
            .collect();
        mines.sort_by_key(|&coords| distance_sq(coords, mine));

        let schedule: Vec<(Coord2, Duration)> = match u32::try_from(mines.len()) {
            Ok(count) if count > 0 => {
                let step = LOSS_REVEAL_TOTAL / (count + 1);
                mines
                    .iter()
                    .zip(0u32..)
                    .map(|(&coords, rank)| (coords, step * rank))
                    .collect()
            }
            _ => Vec::new(),
        };
        log::debug!("Detonated {:?}, revealing {} more mines", mine, schedule.len());

        for &(coords, delay) in &schedule {
            self.flip(coords, false, delay);
        }

        match schedule.last() {
            Some(&(last, _)) => self.misflag_watch = Some(last),
            None => self.mark_misflags(),
        }

        schedule
    }

    /// Fades out every mine; each tile is removed when its fade completes.
    pub fn clear_mines(&mut self) {
        let mines: Vec<Coord2> = self
            .tiles()
            .filter(|tile| tile.is_mine() && !tile.is_removed())
            .map(Tile::coords)
            .collect();
        log::debug!("Clearing {} mines", mines.len());
        for coords in mines {
            self.play_on(coords, WinTileAnim::new(), Duration::ZERO);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        let mut board = Board::new(
            BoardConfig::new(size, mines.len() as CellCount),
            GameRng::seed_from_u64(0),
        );
        for &coords in mines {
            board.tile_mut(coords).set_mine(true);
        }
        board
    }

    fn run_until_settled(board: &mut Board) {
        for _ in 0..10_000 {
            if board.is_settled() {
                return;
            }
            board.update(1.0 / 60.0);
        }
        panic!("board never settled");
    }

    #[test]
    fn cascade_on_empty_board_reveals_everything_once() {
        let mut board = board((12, 17), &[]);

        let flipped = board.flip((5, 5), true, Duration::ZERO);

        assert_eq!(flipped, 12 * 17);
        assert!(board.has_won());
    }

    #[test]
    fn cascade_stops_at_numbers() {
        let mut board = board((3, 5), &[(0, 4), (1, 4), (2, 4)]);

        let flipped = board.flip((1, 0), true, Duration::ZERO);

        assert_eq!(flipped, 12);
        assert!(board.has_won());
        assert!(board.tiles().filter(|t| t.is_mine()).all(|t| t.is_hidden()));
        assert_eq!(board[(1, 3)].touching(), 3);
    }

    #[test]
    fn cascade_skips_flagged_tiles() {
        let mut board = board((1, 4), &[]);
        board.tile_mut((0, 2)).set_flagged(true);

        let flipped = board.flip((0, 0), true, Duration::ZERO);

        assert_eq!(flipped, 2);
        assert!(board[(0, 2)].is_hidden());
        assert!(board[(0, 3)].is_hidden());
    }

    #[test]
    fn cascade_delays_accumulate_along_the_chain() {
        let mut board = board((1, 4), &[]);

        board.flip((0, 0), true, Duration::ZERO);

        let delays: Vec<_> = board
            .tiles()
            .map(|tile| tile.slot().start_at().unwrap())
            .collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                CASCADE_STEP,
                CASCADE_STEP * 2,
                CASCADE_STEP * 3
            ]
        );
    }

    #[test]
    fn cascade_delays_accumulate_across_siblings() {
        let mut board = board((1, 3), &[]);

        board.flip((0, 1), true, Duration::ZERO);

        assert_eq!(board[(0, 0)].slot().start_at(), Some(CASCADE_STEP));
        assert_eq!(board[(0, 2)].slot().start_at(), Some(CASCADE_STEP * 2));
    }

    #[test]
    fn non_recursive_flip_reveals_one() {
        let mut board = board((3, 3), &[]);
        assert_eq!(board.flip((1, 1), false, Duration::ZERO), 1);
        assert_eq!(board.revealed_count(), 1);
    }

    #[test]
    fn flipped_mine_plays_reveal() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.flip((0, 0), true, Duration::from_millis(300));
        assert!(board[(0, 0)].slot().is_anim_pending(AnimCode::RevealMine));
        assert_eq!(board.revealed_count(), 1);
    }

    #[test]
    fn uncover_face_waits_for_delay() {
        let mut board = board((1, 2), &[(0, 1)]);
        board.flip((0, 0), true, Duration::from_millis(200));
        assert_eq!(board[(0, 0)].face(), Face::HIDDEN);

        board.update(0.25);
        assert_eq!(board[(0, 0)].face(), Face::number(1, false));
    }

    #[test]
    fn loss_reveals_nearest_mines_first() {
        let mines = [(0, 0), (0, 9), (0, 3), (0, 6)];
        let mut board = board((1, 10), &mines);

        let schedule = board.detonate((0, 0));

        let order: Vec<_> = schedule.iter().map(|&(coords, _)| coords).collect();
        assert_eq!(order, vec![(0, 3), (0, 6), (0, 9)]);
        assert!(schedule.windows(2).all(|pair| pair[0].1 <= pair[1].1));
        assert_eq!(schedule[0].1, Duration::ZERO);
        assert_eq!(schedule[1].1, LOSS_REVEAL_TOTAL / 4);
        assert_eq!(schedule[2].1, LOSS_REVEAL_TOTAL / 4 * 2);
        assert!(board[(0, 0)].is_red());
        assert!(board.effects.is_anim_active(AnimCode::Detonation));
    }

    #[test]
    fn loss_skips_flagged_mines() {
        let mut board = board((1, 4), &[(0, 0), (0, 1), (0, 3)]);
        board.tile_mut((0, 1)).set_flagged(true);

        let schedule = board.detonate((0, 0));

        assert_eq!(schedule, vec![((0, 3), Duration::ZERO)]);
        assert!(board[(0, 1)].is_hidden());
    }

    #[test]
    fn misflags_turn_red_after_last_mine_starts() {
        let mut board = board((2, 5), &[(0, 0), (0, 2), (0, 4)]);
        board.tile_mut((1, 4)).set_flagged(true);

        board.detonate((0, 0));
        assert!(!board[(1, 4)].is_red());

        // The far mine starts at 5/3 s.
        for _ in 0..60 {
            board.update(1.0 / 60.0);
        }
        assert!(board[(0, 4)].slot().is_anim_pending(AnimCode::RevealMine));
        assert!(!board[(1, 4)].is_red());

        run_until_settled(&mut board);
        assert!(board[(1, 4)].is_red());
        assert!(board[(1, 4)].is_flagged());
        assert_eq!(board[(0, 4)].face(), Face::mine(false));
    }

    #[test]
    fn misflags_turn_red_at_once_without_other_mines() {
        let mut board = board((1, 3), &[(0, 0)]);
        board.tile_mut((0, 2)).set_flagged(true);

        board.detonate((0, 0));

        assert!(board[(0, 2)].is_red());
        assert_eq!(board.misflag_watch, None);
    }

    #[test]
    fn win_clears_mines_after_fade() {
        let mut board = board((2, 2), &[(1, 1)]);
        board.flip((0, 0), false, Duration::ZERO);
        board.flip((0, 1), false, Duration::ZERO);
        board.flip((1, 0), false, Duration::ZERO);
        assert!(board.has_won());

        board.clear_mines();
        assert!(!board[(1, 1)].is_removed());
        run_until_settled(&mut board);

        assert!(board[(1, 1)].is_removed());
        assert!(board.tiles().filter(|t| t.is_safe()).all(|t| !t.is_removed()));
    }
}
