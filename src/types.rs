use serde::{Deserialize, Serialize};

use crate::error::RelayError;

pub const BOARD_SIZE: usize = 8;

/// One of the two sides. Red moves first and toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    Red,
    Black,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Black,
            Player::Black => Player::Red,
        }
    }

    /// Row delta of a single forward step.
    pub fn forward(self) -> i8 {
        match self {
            Player::Red => -1,
            Player::Black => 1,
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        match player {
            Player::Red => 1,
            Player::Black => 2,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = RelayError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::Red),
            2 => Ok(Player::Black),
            other => Err(RelayError::InvalidPlayer(other)),
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// Returns the position shifted by `(dr, dc)` if it stays on the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row as i16 + dr as i16;
        let col = self.col as i16 + dc as i16;
        let range = 0..BOARD_SIZE as i16;
        if range.contains(&row) && range.contains(&col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    pub fn is_dark(self) -> bool {
        (self.row ^ self.col) & 1 == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MoveKind {
    Step,
    Jump { captured: Position },
}

impl MoveKind {
    pub fn is_jump(self) -> bool {
        matches!(self, MoveKind::Jump { .. })
    }
}

/// A move as it was applied to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedMove {
    pub player: Player,
    pub mv: Move,
    pub kind: MoveKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    Local,
    VsAi,
    Online,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Vec<Vec<u8>>,
    pub current_player: Player,
    pub red_count: u8,
    pub black_count: u8,
    pub mode: GameMode,
    pub selected: Option<Position>,
    pub winner: Option<Player>,
    pub last_move: Option<AppliedMove>,
    /// Contract:
    /// - `false` while the AI is to move, the online peer holds the turn,
    ///   or the game has a winner.
    pub accepts_input: bool,
}
