use std::io;

use crate::*;

/// Fixed prefix of every save blob.
pub const SAVE_HEADER: &[u8; 5] = b"MINE ";

const ROWS_MARKER: u8 = b'r';
const COLS_MARKER: u8 = b'c';
const STATUS_MARKER: u8 = b'g';
const TILE_MARKER: u8 = b't';
const TERMINATOR: u8 = 0;

/// Byte-oriented storage the game saves into.
pub trait SaveStore {
    fn open_reader(&mut self) -> io::Result<()>;
    fn read_byte(&mut self) -> io::Result<u8>;
    fn open_writer(&mut self) -> io::Result<()>;
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

/// In-memory [`SaveStore`], handy for tests and for drivers without a disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    bytes: Vec<u8>,
    cursor: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            cursor: 0,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl SaveStore for MemoryStore {
    fn open_reader(&mut self) -> io::Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let byte = self
            .bytes
            .get(self.cursor)
            .copied()
            .ok_or(io::ErrorKind::UnexpectedEof)?;
        self.cursor += 1;
        Ok(byte)
    }

    fn open_writer(&mut self) -> io::Result<()> {
        self.bytes.clear();
        self.cursor = 0;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.bytes.push(byte);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Decoded contents of a save blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveData {
    pub rows: Coord,
    pub cols: Coord,
    pub status: GameStatus,
    /// Row-major.
    pub tiles: Vec<TileBits>,
}

impl SaveData {
    pub fn capture(game: &Game) -> Self {
        let (rows, cols) = game.board.size();
        Self {
            rows,
            cols,
            status: game.status,
            tiles: game.board.tiles().map(Tile::bits).collect(),
        }
    }

    pub fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub fn encode(&self, mut write: impl FnMut(u8) -> io::Result<()>) -> io::Result<()> {
        for &byte in SAVE_HEADER {
            write(byte)?;
        }
        for (marker, value) in [
            (ROWS_MARKER, self.rows),
            (COLS_MARKER, self.cols),
            (STATUS_MARKER, self.status.bits()),
        ] {
            write(marker)?;
            write(value)?;
        }
        for bits in &self.tiles {
            write(TILE_MARKER)?;
            write(bits.bits())?;
        }
        write(TERMINATOR)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(SAVE_HEADER.len() + 7 + 2 * self.tiles.len());
        let _ = self.encode(|byte| {
            bytes.push(byte);
            Ok(())
        });
        bytes
    }

    pub fn decode(mut read: impl FnMut() -> io::Result<u8>) -> SaveResult<Self> {
        for &expected in SAVE_HEADER {
            if read()? != expected {
                return Err(SaveError::BadHeader);
            }
        }

        let rows = read_field(&mut read, ROWS_MARKER)?;
        let cols = read_field(&mut read, COLS_MARKER)?;
        if !(1..=MAX_DIM).contains(&rows) || !(1..=MAX_DIM).contains(&cols) {
            return Err(SaveError::BadDimensions { rows, cols });
        }

        let status = read_field(&mut read, STATUS_MARKER)?;
        let status = GameStatus::from_bits(status).ok_or(SaveError::BadBits {
            field: "status",
            value: status,
        })?;

        let tiles = (0..mult(rows, cols))
            .map(|_| {
                let bits = read_field(&mut read, TILE_MARKER)?;
                TileBits::from_bits(bits).ok_or(SaveError::BadBits {
                    field: "tile",
                    value: bits,
                })
            })
            .collect::<SaveResult<Vec<_>>>()?;

        if read()? != TERMINATOR {
            return Err(SaveError::MissingTerminator);
        }

        Ok(Self {
            rows,
            cols,
            status,
            tiles,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> SaveResult<Self> {
        let mut bytes = bytes.iter().copied();
        Self::decode(|| bytes.next().ok_or_else(|| io::ErrorKind::UnexpectedEof.into()))
    }
}

fn read_field(
    read: &mut impl FnMut() -> io::Result<u8>,
    marker: u8,
) -> SaveResult<u8> {
    let found = read()?;
    if found != marker {
        return Err(SaveError::MissingMarker {
            expected: char::from(marker),
            found,
        });
    }
    Ok(read()?)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The saved game was restored.
    Restored,
    /// The save was unusable and a fresh board was set up instead.
    Fresh,
}

impl Game {
    pub fn save(&self, store: &mut dyn SaveStore) -> SaveResult<()> {
        let data = SaveData::capture(self);
        store.open_writer()?;
        let written = data.encode(|byte| store.write_byte(byte));
        let closed = store.close();
        written?;
        closed?;
        log::debug!("Saved {}x{} game, status {:?}", data.rows, data.cols, data.status);
        Ok(())
    }

    /// Restores a saved game, falling back to a fresh board when the save cannot be used.
    pub fn load(&mut self, store: &mut dyn SaveStore) -> LoadOutcome {
        match read_save(store) {
            Ok(data) => {
                log::debug!("Loaded {}x{} game, status {:?}", data.rows, data.cols, data.status);
                self.restore(data);
                LoadOutcome::Restored
            }
            Err(err) => {
                log::warn!("Ignoring unusable save: {err}");
                self.restart();
                LoadOutcome::Fresh
            }
        }
    }

    /// Replaces the board with saved tile state, without animation.
    pub(crate) fn restore(&mut self, data: SaveData) {
        let placed = data
            .tiles
            .iter()
            .filter(|bits| bits.contains(TileBits::MINE))
            .count() as CellCount;

        let current = self.board.config();
        if current.size == data.size() {
            self.restart();
        } else {
            let mines = if data.status.is_ready() {
                current.mines
            } else {
                placed
            };
            self.set_config(
                BoardConfig::new(data.size(), mines).with_safe_budget(current.safe_budget),
            );
        }

        let cols = data.cols;
        let coords = (0..data.rows).flat_map(|row| (0..cols).map(move |col| (row, col)));
        for (coords, bits) in coords.zip(data.tiles) {
            self.board.tile_mut(coords).apply_bits(bits);
        }
        if !data.status.is_ready() {
            self.board.set_mine_count(placed);
        }
        self.board.settle_faces();
        self.status = data.status;
    }
}

fn read_save(store: &mut dyn SaveStore) -> SaveResult<SaveData> {
    store.open_reader()?;
    let data = SaveData::decode(|| store.read_byte());
    let closed = store.close();
    let data = data?;
    closed?;
    Ok(data)
}
