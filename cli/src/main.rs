use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use tilesweep_core::*;

use store::FileStore;
use view::{DrawCounter, ascii_board};

mod store;
mod view;

/// Frames stepped after a move before giving up on the board settling.
const MAX_SETTLE_FRAMES: u64 = 100_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Level {
    Beginner,
    Intermediate,
    Expert,
}

/// A scripted input: `ROW,COL` clicks a tile, `fROW,COL` toggles its flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Move {
    Click(Coord2),
    Flag(Coord2),
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let (flag, coords) = match s.strip_prefix('f') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (row, col) = coords
            .split_once(',')
            .ok_or_else(|| format!("expected ROW,COL, got {s:?}"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<Coord>()
                .map_err(|err| format!("bad coordinate {part:?}: {err}"))
        };
        let coords = (parse(row)?, parse(col)?);
        Ok(if flag {
            Self::Flag(coords)
        } else {
            Self::Click(coords)
        })
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Headless tile-sweeping driver", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Seed for board generation and effects
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(short, long, value_enum, default_value_t = Level::Beginner)]
    difficulty: Level,

    /// Override the row count of the chosen difficulty
    #[arg(long)]
    rows: Option<Coord>,

    /// Override the column count of the chosen difficulty
    #[arg(long)]
    cols: Option<Coord>,

    /// Override the mine count of the chosen difficulty
    #[arg(long)]
    mines: Option<CellCount>,

    /// Tiles revealed around the first click
    #[arg(long, default_value_t = DEFAULT_SAFE_BUDGET)]
    safe_budget: CellCount,

    /// Moves to play in order: ROW,COL clicks, fROW,COL toggles a flag
    #[arg(short = 'm', long = "move")]
    moves: Vec<Move>,

    /// Restore a saved game before playing
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save the game after playing
    #[arg(long)]
    save: Option<PathBuf>,

    /// Frames per second used to step animations
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Print a JSON summary instead of the board
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> Result<BoardConfig> {
        let preset = match self.difficulty {
            Level::Beginner => Difficulty::Beginner,
            Level::Intermediate => Difficulty::Intermediate,
            Level::Expert => Difficulty::Expert,
        }
        .config();

        let size = (
            self.rows.unwrap_or(preset.size.0),
            self.cols.unwrap_or(preset.size.1),
        );
        let config = BoardConfig::try_new(size, self.mines.unwrap_or(preset.mines))
            .with_context(|| format!("Invalid board size {size:?}"))?;
        Ok(config.with_safe_budget(self.safe_budget))
    }
}

#[derive(Serialize, Debug)]
struct Summary {
    seed: u64,
    config: BoardConfig,
    status: GameStatus,
    mines: CellCount,
    flags_left: isize,
    revealed: CellCount,
    frames: u64,
    sprites: usize,
    polygons: usize,
}

/// Steps frames until every animation is done. Returns the number of frames stepped.
fn settle(game: &mut Game, dt: f64) -> Result<u64> {
    let mut frames = 0;
    let mut counter = DrawCounter::default();
    while !game.is_settled() {
        if frames >= MAX_SETTLE_FRAMES {
            bail!("board did not settle after {frames} frames");
        }
        game.update(dt);
        game.render(&mut counter);
        frames += 1;
    }
    log::trace!("Settled after {frames} frames, {counter:?}");
    Ok(frames)
}

fn play(game: &mut Game, mv: Move) -> Result<()> {
    let applied = match mv {
        Move::Click(coords) => game.on_click(coords).map(|outcome| {
            log::info!("Click {coords:?}: {outcome:?}");
        }),
        Move::Flag(coords) => game.on_alt_click(coords).map(|outcome| {
            log::info!("Flag {coords:?}: {outcome:?}");
        }),
    };
    match applied {
        Err(GameError::AlreadyEnded) => {
            log::warn!("Ignoring {mv:?}, the game is over");
            Ok(())
        }
        other => other.with_context(|| format!("Could not play {mv:?}")),
    }
}

fn run(args: Args) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }
    let dt = args.fps.recip();

    let mut game = Game::new(args.config()?, args.seed);
    if let Some(path) = &args.load {
        let outcome = game.load(&mut FileStore::new(path));
        log::info!("Loading {}: {outcome:?}", path.display());
    }

    let mut frames = 0;
    for &mv in &args.moves {
        play(&mut game, mv)?;
        frames += settle(&mut game, dt)?;
    }

    if let Some(path) = &args.save {
        game.save(&mut FileStore::new(path))
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }

    let mut counter = DrawCounter::default();
    game.render(&mut counter);

    if args.json {
        let summary = Summary {
            seed: args.seed,
            config: game.config(),
            status: game.status(),
            mines: game.board().mine_count(),
            flags_left: game.flags_left(),
            revealed: game.board().revealed_count(),
            frames,
            sprites: counter.sprites,
            polygons: counter.polygons,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", ascii_board(game.board()));
        println!(
            "status: {:?}  flags left: {}",
            game.status(),
            game.flags_left()
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("Args: {args:?}");
    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves() {
        assert_eq!("3,4".parse(), Ok(Move::Click((3, 4))));
        assert_eq!("f0, 12".parse(), Ok(Move::Flag((0, 12))));
        assert!("3".parse::<Move>().is_err());
        assert!("3,x".parse::<Move>().is_err());
    }

    #[test]
    fn overrides_are_clamped() {
        let args = Args::parse_from(["tilesweep", "-d", "expert", "--rows", "40", "--mines", "5"]);
        let config = args.config().unwrap();
        assert_eq!(config.size, (MAX_DIM, 30));
        assert_eq!(config.mines, 5);

        let args = Args::parse_from(["tilesweep", "--cols", "0"]);
        assert!(args.config().is_err());
    }

    #[test]
    fn scripted_game_settles() {
        let mut game = Game::new(BoardConfig::beginner(), 2);
        play(&mut game, Move::Click((4, 4))).unwrap();
        let frames = settle(&mut game, 1.0 / 60.0).unwrap();

        assert!(frames > 0);
        assert!(game.is_settled());
        assert!(game.status().contains(GameStatus::STARTED));
    }

    #[test]
    fn moves_after_the_end_are_ignored() {
        let mut game = Game::new(BoardConfig::new((1, 3), 0), 0);
        play(&mut game, Move::Click((0, 0))).unwrap();
        assert!(play(&mut game, Move::Flag((0, 1))).is_ok());
        assert!(play(&mut game, Move::Click((5, 5))).is_err());
    }
}
