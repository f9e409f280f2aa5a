//! JS-facing API. The page owns the canvas, the socket and the timers; it
//! forwards clicks and socket events here and paints the returned scene.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::game::{ClickOutcome, GameInstance};
use crate::relay::{ClientEvent, InboundMove, ServerEvent, SessionUpdate};
use crate::render::Scene;
use crate::types::{AppliedMove, GameMode, Position};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClickReport {
    outcome: &'static str,
    selected: Option<Position>,
    applied: Option<AppliedMove>,
    /// Milliseconds to wait before calling `aiMove`.
    ai_delay_ms: Option<u32>,
    /// Socket event to emit, if any.
    emit: Option<ClientEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionReport {
    kind: &'static str,
    room_id: Option<String>,
    message: Option<String>,
}

#[wasm_bindgen]
pub struct CheckersGame {
    game: GameInstance,
    config: GameConfig,
}

#[wasm_bindgen]
impl CheckersGame {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CheckersGame, JsError> {
        let config = GameConfig::from_js(config)?;
        Ok(Self {
            game: GameInstance::new_with_default_selector(GameMode::Local),
            config,
        })
    }

    /// Accepts `offline`, `ai` or `online` (and the serialized mode names).
    pub fn start(&mut self, mode: &str) -> Result<(), JsError> {
        let mode = parse_mode(mode).ok_or_else(|| JsError::new(&format!("unknown mode: {mode}")))?;
        self.game.start(mode);
        Ok(())
    }

    pub fn click(&mut self, x: f64, y: f64) -> Result<JsValue, JsError> {
        let outcome = self.game.click_pixel(x, y, self.config.tile_size)?;

        let mut report = ClickReport {
            outcome: "ignored",
            selected: self.game.selected,
            applied: None,
            ai_delay_ms: None,
            emit: None,
        };

        match outcome {
            ClickOutcome::Ignored => {}
            ClickOutcome::Selected(_) => report.outcome = "selected",
            ClickOutcome::Deselected => report.outcome = "deselected",
            ClickOutcome::Moved { applied, emit } => {
                report.outcome = "moved";
                report.applied = Some(applied);
                if self.game.needs_ai_move() {
                    report.ai_delay_ms = Some(self.config.ai_delay_ms);
                }
                report.emit = emit;
            }
        }

        to_js(&report)
    }

    /// Plays the AI reply. Returns the applied move, or `undefined` when the
    /// AI has nothing to play.
    #[wasm_bindgen(js_name = aiMove)]
    pub fn ai_move(&mut self) -> Result<JsValue, JsError> {
        let applied = self.game.do_ai_move()?;
        to_js(&applied)
    }

    #[wasm_bindgen(js_name = needsAiMove)]
    pub fn needs_ai_move(&self) -> bool {
        self.game.needs_ai_move()
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.game.to_game_state())
    }

    pub fn scene(&self) -> Result<JsValue, JsError> {
        to_js(&Scene::from_board(self.game.board(), self.game.selected, &self.config))
    }

    #[wasm_bindgen(js_name = canvasSize)]
    pub fn canvas_size(&self) -> u32 {
        self.config.canvas_size()
    }

    #[wasm_bindgen(js_name = createRoom)]
    pub fn create_room(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.game.create_room())
    }

    #[wasm_bindgen(js_name = joinRoom)]
    pub fn join_room(&mut self, room_id: &str) -> Result<JsValue, JsError> {
        let event = self.game.join_room(room_id)?;
        to_js(&event)
    }

    #[wasm_bindgen(js_name = roomId)]
    pub fn room_id(&self) -> Option<String> {
        self.game.session().room_id().map(str::to_string)
    }

    /// Feeds one socket event (`roomCreated`, `roomJoined`, `roomError`,
    /// `move`) into the session and applies its effect to the game.
    #[wasm_bindgen(js_name = onServerEvent)]
    pub fn on_server_event(&mut self, name: &str, data: JsValue) -> Result<JsValue, JsError> {
        let event = match name {
            "roomCreated" => ServerEvent::RoomCreated(expect_string(name, &data)?),
            "roomJoined" => ServerEvent::RoomJoined,
            "roomError" => ServerEvent::RoomError(expect_string(name, &data)?),
            "move" => {
                let inbound: InboundMove = serde_wasm_bindgen::from_value(data)
                    .map_err(|e| JsError::new(&format!("malformed move event: {e}")))?;
                ServerEvent::Move(inbound)
            }
            other => return Err(JsError::new(&format!("unknown server event: {other}"))),
        };

        let report = match self.game.handle_server_event(event)? {
            SessionUpdate::RoomCreated(id) => SessionReport {
                kind: "roomCreated",
                room_id: Some(id),
                message: None,
            },
            SessionUpdate::GameStarted => SessionReport {
                kind: "gameStarted",
                room_id: self.game.session().room_id().map(str::to_string),
                message: None,
            },
            SessionUpdate::Error(message) => SessionReport {
                kind: "error",
                room_id: None,
                message: Some(message),
            },
            SessionUpdate::RemoteMove { .. } => SessionReport {
                kind: "remoteMove",
                room_id: None,
                message: None,
            },
        };

        to_js(&report)
    }
}

#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    crate::logging::init(crate::logging::parse_level(level));
}

fn parse_mode(mode: &str) -> Option<GameMode> {
    match mode {
        "offline" | "local" => Some(GameMode::Local),
        "ai" | "vsAi" => Some(GameMode::VsAi),
        "online" => Some(GameMode::Online),
        _ => None,
    }
}

fn expect_string(name: &str, data: &JsValue) -> Result<String, JsError> {
    data.as_string()
        .ok_or_else(|| JsError::new(&format!("{name} event needs a string payload")))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode_accepts_menu_and_serialized_names() {
        assert_eq!(parse_mode("offline"), Some(GameMode::Local));
        assert_eq!(parse_mode("ai"), Some(GameMode::VsAi));
        assert_eq!(parse_mode("vsAi"), Some(GameMode::VsAi));
        assert_eq!(parse_mode("online"), Some(GameMode::Online));
        assert_eq!(parse_mode("hotseat"), None);
    }
}
