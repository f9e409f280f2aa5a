//! Board renderer.
//!
//! Builds a flat draw list from the board; the host page paints it onto its
//! canvas. Nothing here holds state between frames.

use serde::Serialize;

use crate::board::Board;
use crate::config::GameConfig;
use crate::types::{BOARD_SIZE, Player, Position};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub color: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceMark {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub color: String,
    pub player: Player,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>,
    pub pieces: Vec<PieceMark>,
}

impl Scene {
    pub fn from_board(board: &Board, selected: Option<Position>, config: &GameConfig) -> Self {
        let tile = config.tile_size;
        let half = tile as f64 / 2.0;
        let radius = tile as f64 / config.piece_radius_divisor;
        let mut tiles = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        let mut pieces = Vec::new();

        for row in 0..BOARD_SIZE as u8 {
            for col in 0..BOARD_SIZE as u8 {
                let pos = Position::new(row, col);
                let x = (col as u32).saturating_mul(tile);
                let y = (row as u32).saturating_mul(tile);

                tiles.push(Tile {
                    x,
                    y,
                    size: tile,
                    color: if pos.is_dark() {
                        config.dark_tile.clone()
                    } else {
                        config.light_tile.clone()
                    },
                    highlighted: selected == Some(pos),
                });

                if let Some(player) = board.get(pos) {
                    pieces.push(PieceMark {
                        cx: x as f64 + half,
                        cy: y as f64 + half,
                        radius,
                        color: match player {
                            Player::Red => config.red_piece.clone(),
                            Player::Black => config.black_piece.clone(),
                        },
                        player,
                    });
                }
            }
        }

        Self {
            width: config.canvas_size(),
            height: config.canvas_size(),
            tiles,
            pieces,
        }
    }
}

/// Maps a canvas offset to the tile under it.
pub fn pixel_to_cell(x: f64, y: f64, tile_size: u32) -> Option<Position> {
    if tile_size == 0 || !(x >= 0.0 && y >= 0.0) {
        return None;
    }
    let col = (x / tile_size as f64).floor() as usize;
    let row = (y / tile_size as f64).floor() as usize;
    if row < BOARD_SIZE && col < BOARD_SIZE {
        Some(Position::new(row as u8, col as u8))
    } else {
        None
    }
}
