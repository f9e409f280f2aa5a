//! Random move selection for the computer side.
//!
//! Neither selector searches or evaluates positions: they pick uniformly from
//! the moves available right now.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::board::Board;
use crate::game::MoveSelector;
use crate::types::{Move, Player};

/// Picks uniformly among available jumps, falling back to steps.
#[derive(Debug, Clone)]
pub struct RandomMoveSelector {
    rng: StdRng,
}

impl RandomMoveSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMoveSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSelector for RandomMoveSelector {
    fn select_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        let legal = board.legal_moves(player);
        let jumps: Vec<Move> = legal
            .iter()
            .filter(|(_, kind)| kind.is_jump())
            .map(|(mv, _)| *mv)
            .collect();

        if !jumps.is_empty() {
            return jumps.choose(&mut self.rng).copied();
        }

        let steps: Vec<Move> = legal.into_iter().map(|(mv, _)| mv).collect();
        steps.choose(&mut self.rng).copied()
    }
}

/// Picks uniformly among every legal move, captures included, with no preference.
#[derive(Debug, Clone)]
pub struct UniformMoveSelector {
    rng: StdRng,
}

impl UniformMoveSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformMoveSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSelector for UniformMoveSelector {
    fn select_move(&mut self, board: &Board, player: Player) -> Option<Move> {
        board
            .legal_moves(player)
            .choose(&mut self.rng)
            .map(|(mv, _)| *mv)
    }
}
