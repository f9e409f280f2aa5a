//! Game configuration
//!
//! Every field has a default, so hosts only pass what they want to change.
//! The browser hands over a plain JS object; native hosts can use JSON text.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::ConfigError;
use crate::types::BOARD_SIZE;

/// Largest tile size whose canvas edge still fits in a `u32`.
pub const MAX_TILE_SIZE: u32 = u32::MAX / BOARD_SIZE as u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Edge length of one board tile in canvas pixels
    pub tile_size: u32,
    pub dark_tile: String,
    pub light_tile: String,
    pub red_piece: String,
    pub black_piece: String,
    /// Piece radius is `tile_size / piece_radius_divisor`
    pub piece_radius_divisor: f64,
    /// Pause before the AI answers a human move
    pub ai_delay_ms: u32,
    /// How long a room may wait for its second player
    pub room_ttl_secs: u64,
    /// One of `error`, `warn`, `info`, `debug`, `trace`
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 75,
            dark_tile: "#3b3b3b".to_string(),
            light_tile: "#e2e2e2".to_string(),
            red_piece: "red".to_string(),
            black_piece: "black".to_string(),
            piece_radius_divisor: 2.5,
            ai_delay_ms: 500,
            room_ttl_secs: 600,
            log_level: "info".to_string(),
        }
    }
}

impl GameConfig {
    /// Reads a config from a JS object; `undefined` and `null` yield defaults.
    pub fn from_js(value: JsValue) -> Result<Self, ConfigError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_wasm_bindgen::from_value(value)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if self.tile_size > MAX_TILE_SIZE {
            return Err(ConfigError::TileTooLarge(self.tile_size));
        }
        if !(self.piece_radius_divisor > 0.0) {
            return Err(ConfigError::BadRadiusDivisor(self.piece_radius_divisor));
        }
        Ok(())
    }

    /// Canvas edge length in pixels. Saturates for unvalidated tile sizes.
    pub fn canvas_size(&self) -> u32 {
        self.tile_size.saturating_mul(BOARD_SIZE as u32)
    }

    pub fn log_level(&self) -> log::Level {
        crate::logging::parse_level(&self.log_level)
    }
}
