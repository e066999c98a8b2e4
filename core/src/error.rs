use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Reasons a save blob could not be read back.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Save store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Save header mismatch")]
    BadHeader,
    #[error("Expected field marker {expected:?}, found byte {found:#04x}")]
    MissingMarker { expected: char, found: u8 },
    #[error("Saved board {rows}x{cols} is outside the supported size")]
    BadDimensions { rows: u8, cols: u8 },
    #[error("Unknown bits in {field}: {value:#04x}")]
    BadBits { field: &'static str, value: u8 },
    #[error("Save data is missing its terminator")]
    MissingTerminator,
}

pub type SaveResult<T> = core::result::Result<T, SaveError>;
