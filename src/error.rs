use thiserror::Error;

use crate::types::Position;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("position ({}, {}) is off the board", .0.row, .0.col)]
    OutOfRange(Position),
    #[error("it is not the AI's turn")]
    NotAiTurn,
    #[error("game is already over")]
    GameOver,
    #[error("AI selected an illegal move")]
    IllegalAiMove,
    #[error(transparent)]
    Relay(#[from] RelayError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("board must have 8 rows of 8 cells, got {0} rows")]
    BadRowCount(usize),
    #[error("board row {row} must have 8 cells, got {len}")]
    BadRowLength { row: usize, len: usize },
    #[error("invalid cell value {value} at ({row}, {col})")]
    InvalidCell { row: usize, col: usize, value: u8 },
    #[error("invalid player value {0}")]
    InvalidPlayer(u8),
    #[error("room id must not be empty")]
    EmptyRoomId,
    #[error("not in a room")]
    NoRoom,
    #[error("malformed relay frame: {0}")]
    Frame(String),
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Frame(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Parse(String),
    #[error("tile size must be positive")]
    ZeroTileSize,
    #[error("tile size {0} is too large for an 8x8 canvas")]
    TileTooLarge(u32),
    #[error("piece radius divisor must be positive, got {0}")]
    BadRadiusDivisor(f64),
}
