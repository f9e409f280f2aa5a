use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod relay;
pub mod render;
pub mod rooms;
pub mod types;
pub mod wasm;

pub use board::Board;
pub use config::GameConfig;
pub use error::{ConfigError, GameError, RelayError};
pub use game::{ClickOutcome, GameInstance, MoveSelector};
pub use types::{GameMode, GameState, Move, MoveKind, Player, Position};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
