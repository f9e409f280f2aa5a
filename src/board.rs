use crate::error::RelayError;
use crate::types::{BOARD_SIZE, Move, MoveKind, Player, Position};

const PIECE_ROWS: usize = 3;
const JUMP_OFFSETS: [(i8, i8); 4] = [(-2, -2), (-2, 2), (2, -2), (2, 2)];

/// Checkers board: one optional piece per cell, no king state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Player>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates the initial board:
    /// black on the dark squares of rows 0-2, red on the dark squares of rows 5-7.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let pos = Position::new(row as u8, col as u8);
                if !pos.is_dark() {
                    continue;
                }
                if row < PIECE_ROWS {
                    board.set(pos, Some(Player::Black));
                } else if row >= BOARD_SIZE - PIECE_ROWS {
                    board.set(pos, Some(Player::Red));
                }
            }
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Returns the piece at `pos`, or `None` for empty and off-board cells.
    pub fn get(&self, pos: Position) -> Option<Player> {
        if !pos.in_bounds() {
            return None;
        }
        self.cells[pos.row as usize][pos.col as usize]
    }

    /// Off-board positions are ignored.
    pub fn set(&mut self, pos: Position, cell: Option<Player>) {
        if pos.in_bounds() {
            self.cells[pos.row as usize][pos.col as usize] = cell;
        }
    }

    /// Returns `(red_count, black_count)`.
    pub fn count(&self) -> (u8, u8) {
        self.cells
            .iter()
            .flatten()
            .fold((0, 0), |(red, black), cell| match cell {
                Some(Player::Red) => (red + 1, black),
                Some(Player::Black) => (red, black + 1),
                None => (red, black),
            })
    }

    pub fn pieces_of(&self, player: Player) -> u8 {
        match player {
            Player::Red => self.count().0,
            Player::Black => self.count().1,
        }
    }

    /// Classifies a move for `mover` without touching the board.
    ///
    /// Single steps must go diagonally forward. Jumps may go in either
    /// vertical direction as long as an opposing piece sits in between.
    pub fn classify_move(&self, from: Position, to: Position, mover: Player) -> Option<MoveKind> {
        if !from.in_bounds() || !to.in_bounds() {
            return None;
        }
        if self.get(to).is_some() {
            return None;
        }

        let dr = to.row as i8 - from.row as i8;
        let dc = to.col as i8 - from.col as i8;

        if dc.abs() == 1 && dr == mover.forward() {
            return Some(MoveKind::Step);
        }

        if dc.abs() == 2 && dr.abs() == 2 {
            let captured = from.offset(dr / 2, dc / 2)?;
            if let Some(piece) = self.get(captured)
                && piece != mover
            {
                return Some(MoveKind::Jump { captured });
            }
        }

        None
    }

    /// Moves the piece and removes the captured one for a jump.
    /// Callers pass a `kind` obtained from `classify_move` on this board.
    pub fn apply_move(&mut self, mv: Move, kind: MoveKind) {
        let piece = self.get(mv.from);
        self.set(mv.to, piece);
        self.set(mv.from, None);
        if let MoveKind::Jump { captured } = kind {
            self.set(captured, None);
        }
    }

    /// Every move `classify_move` accepts for the player's pieces,
    /// in row-major order of the source square.
    pub fn legal_moves(&self, player: Player) -> Vec<(Move, MoveKind)> {
        let step_offsets = [(player.forward(), -1), (player.forward(), 1)];
        let mut moves = Vec::new();

        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let from = Position::new(row as u8, col as u8);
                if self.get(from) != Some(player) {
                    continue;
                }

                for (dr, dc) in step_offsets.into_iter().chain(JUMP_OFFSETS) {
                    let Some(to) = from.offset(dr, dc) else {
                        continue;
                    };
                    if let Some(kind) = self.classify_move(from, to, player) {
                        moves.push((Move::new(from, to), kind));
                    }
                }
            }
        }

        moves
    }

    /// Converts the board to rows of `0=empty, 1=red, 2=black`.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.map_or(0, u8::from)).collect())
            .collect()
    }

    /// Parses the wire form produced by `to_rows`, rejecting any other shape.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, RelayError> {
        if rows.len() != BOARD_SIZE {
            return Err(RelayError::BadRowCount(rows.len()));
        }

        let mut board = Self::empty();
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != BOARD_SIZE {
                return Err(RelayError::BadRowLength {
                    row,
                    len: cells.len(),
                });
            }
            for (col, &value) in cells.iter().enumerate() {
                let cell = match value {
                    0 => None,
                    v => Some(
                        Player::try_from(v)
                            .map_err(|_| RelayError::InvalidCell { row, col, value })?,
                    ),
                };
                board.cells[row][col] = cell;
            }
        }

        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
