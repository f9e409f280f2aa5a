//! Online play: relay events and the client-side session.
//!
//! The relay forwards whole-board snapshots between two peers. The receiver
//! checks that a snapshot is well-formed but trusts the move it encodes.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::RelayError;
use crate::types::Player;

/// Board and side to move after the sender's move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePayload {
    pub board: Vec<Vec<u8>>,
    pub turn: u8,
}

impl MovePayload {
    pub fn new(board: &Board, turn: Player) -> Self {
        Self {
            board: board.to_rows(),
            turn: turn.into(),
        }
    }

    /// Validates shape and values and converts to game types.
    pub fn decode(&self) -> Result<(Board, Player), RelayError> {
        let board = Board::from_rows(&self.board)?;
        let turn = Player::try_from(self.turn)?;
        Ok((board, turn))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMove {
    pub room_id: String,
    #[serde(rename = "move")]
    pub payload: MovePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMove {
    #[serde(rename = "move")]
    pub payload: MovePayload,
}

/// Events a client emits to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    CreateRoom,
    JoinRoom(String),
    Move(OutboundMove),
}

/// Events the relay delivers to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    RoomCreated(String),
    RoomJoined,
    RoomError(String),
    Move(InboundMove),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CreateRoom => "createRoom",
            ClientEvent::JoinRoom(_) => "joinRoom",
            ClientEvent::Move(_) => "move",
        }
    }

    pub fn to_json(&self) -> Result<String, RelayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, RelayError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::RoomCreated(_) => "roomCreated",
            ServerEvent::RoomJoined => "roomJoined",
            ServerEvent::RoomError(_) => "roomError",
            ServerEvent::Move(_) => "move",
        }
    }

    pub fn to_json(&self) -> Result<String, RelayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, RelayError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// Waiting for `roomCreated` or `roomJoined`.
    Pending,
    Playing,
}

/// What the page should do after an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    RoomCreated(String),
    GameStarted,
    Error(String),
    RemoteMove { board: Board, turn: Player },
}

#[derive(Debug, Clone)]
pub struct RelaySession {
    room_id: Option<String>,
    phase: SessionPhase,
    is_my_turn: bool,
}

impl RelaySession {
    pub fn new() -> Self {
        Self {
            room_id: None,
            phase: SessionPhase::Idle,
            is_my_turn: true,
        }
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_my_turn(&self) -> bool {
        self.is_my_turn
    }

    pub fn create_room(&mut self) -> ClientEvent {
        self.phase = SessionPhase::Pending;
        ClientEvent::CreateRoom
    }

    pub fn join_room(&mut self, room_id: &str) -> Result<ClientEvent, RelayError> {
        let room_id = room_id.trim();
        if room_id.is_empty() {
            return Err(RelayError::EmptyRoomId);
        }
        self.room_id = Some(room_id.to_string());
        self.phase = SessionPhase::Pending;
        Ok(ClientEvent::JoinRoom(room_id.to_string()))
    }

    pub fn handle(&mut self, event: ServerEvent) -> Result<SessionUpdate, RelayError> {
        match event {
            ServerEvent::RoomCreated(id) => {
                log::info!("room created: {id}");
                self.room_id = Some(id.clone());
                Ok(SessionUpdate::RoomCreated(id))
            }
            ServerEvent::RoomJoined => {
                log::info!("peer joined, game starting");
                self.phase = SessionPhase::Playing;
                self.is_my_turn = true;
                Ok(SessionUpdate::GameStarted)
            }
            ServerEvent::RoomError(message) => {
                log::warn!("room error: {message}");
                Ok(SessionUpdate::Error(message))
            }
            ServerEvent::Move(inbound) => {
                let (board, turn) = inbound.payload.decode().inspect_err(|e| {
                    log::warn!("dropping malformed move from peer: {e}");
                })?;
                self.is_my_turn = true;
                Ok(SessionUpdate::RemoteMove { board, turn })
            }
        }
    }

    /// Builds the `move` event for a local move and hands the turn to the peer.
    pub fn send_move(&mut self, board: &Board, turn: Player) -> Result<ClientEvent, RelayError> {
        let room_id = self.room_id.clone().ok_or(RelayError::NoRoom)?;
        self.is_my_turn = false;
        Ok(ClientEvent::Move(OutboundMove {
            room_id,
            payload: MovePayload::new(board, turn),
        }))
    }
}

impl Default for RelaySession {
    fn default() -> Self {
        Self::new()
    }
}
