use tilesweep_core::{Board, Point, RenderSink, Sprite, Tile};

/// Counts what a frame would draw.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawCounter {
    pub sprites: usize,
    pub polygons: usize,
}

impl RenderSink for DrawCounter {
    fn draw(&mut self, _sprite: &Sprite) {
        self.sprites += 1;
    }

    fn fill_polygon(&mut self, _points: &[Point], _alpha: f32) {
        self.polygons += 1;
    }
}

fn tile_char(tile: &Tile) -> char {
    match (tile.is_removed(), tile.is_hidden(), tile.is_mine()) {
        (true, _, _) => ' ',
        (_, true, _) if tile.is_flagged() && tile.is_red() => 'x',
        (_, true, _) if tile.is_flagged() => 'F',
        (_, true, _) => '#',
        (_, false, true) if tile.is_red() => '@',
        (_, false, true) => '*',
        (_, false, false) => match tile.touching() {
            0 => '.',
            n => char::from(b'0' + n),
        },
    }
}

/// Plain-text picture of the board, one line per row.
pub fn ascii_board(board: &Board) -> String {
    let (_, cols) = board.size();
    let mut out = String::new();
    for (index, tile) in board.tiles().enumerate() {
        out.push(tile_char(tile));
        if (index + 1) % usize::from(cols) == 0 {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilesweep_core::{BoardConfig, Game};

    #[test]
    fn fresh_board_is_all_hidden() {
        let game = Game::new(BoardConfig::new((2, 3), 1), 0);
        assert_eq!(ascii_board(game.board()), "###\n###\n");
    }

    #[test]
    fn empty_board_reveals_to_dots() {
        let mut game = Game::new(BoardConfig::new((1, 3), 0), 0);
        game.on_click((0, 0)).unwrap();
        assert_eq!(ascii_board(game.board()), "...\n");
    }

    #[test]
    fn counter_sees_hidden_tiles() {
        let game = Game::new(BoardConfig::new((2, 2), 0), 0);
        let mut counter = DrawCounter::default();
        game.render(&mut counter);
        assert_eq!(counter.sprites, 4);
        assert_eq!(counter.polygons, 0);
    }
}
