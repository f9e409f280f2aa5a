//! Relay side of online play: pairs two peers per room and forwards their
//! move snapshots. The transport (socket server, worker, test harness) owns
//! the connections and delivers whatever this registry returns.

use std::collections::HashMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use web_time::Instant;

use crate::relay::{InboundMove, OutboundMove, ServerEvent};

pub const ROOM_ID_LEN: usize = 6;
const ROOM_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_CAPACITY: usize = 2;

pub type PeerId = u64;

/// One event addressed to one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: PeerId,
    pub event: ServerEvent,
}

impl Delivery {
    fn new(to: PeerId, event: ServerEvent) -> Self {
        Self { to, event }
    }

    fn error(to: PeerId, message: &str) -> Self {
        Self::new(to, ServerEvent::RoomError(message.to_string()))
    }
}

#[derive(Debug)]
struct Room {
    peers: Vec<PeerId>,
    created_at: Instant,
    /// Set once a second peer joins; a paired room closes when either leaves.
    paired: bool,
}

pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    peer_rooms: HashMap<PeerId, String>,
    ttl: Duration,
    rng: StdRng,
}

impl RoomRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self::with_rng(ttl, StdRng::from_entropy())
    }

    pub fn with_seed(ttl: Duration, seed: u64) -> Self {
        Self::with_rng(ttl, StdRng::seed_from_u64(seed))
    }

    fn with_rng(ttl: Duration, rng: StdRng) -> Self {
        Self {
            rooms: HashMap::new(),
            peer_rooms: HashMap::new(),
            ttl,
            rng,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_of(&self, peer: PeerId) -> Option<&str> {
        self.peer_rooms.get(&peer).map(String::as_str)
    }

    /// Opens a new room with `peer` as its only member. A peer already in a
    /// room leaves it first.
    pub fn create_room(&mut self, peer: PeerId, now: Instant) -> Vec<Delivery> {
        let mut out = self.leave(peer);

        let id = self.fresh_room_id();
        self.rooms.insert(
            id.clone(),
            Room {
                peers: vec![peer],
                created_at: now,
                paired: false,
            },
        );
        self.peer_rooms.insert(peer, id.clone());
        log::info!("peer {peer} created room {id}");

        out.push(Delivery::new(peer, ServerEvent::RoomCreated(id)));
        out
    }

    pub fn join_room(&mut self, peer: PeerId, room_id: &str) -> Vec<Delivery> {
        let room_id = normalize_room_id(room_id);
        let Some(room) = self.rooms.get(room_id) else {
            return vec![Delivery::error(peer, "Room not found")];
        };
        if room.peers.contains(&peer) {
            return vec![Delivery::error(peer, "Already in this room")];
        }
        if room.peers.len() >= ROOM_CAPACITY {
            return vec![Delivery::error(peer, "Room is full")];
        }

        let mut out = self.leave(peer);
        let Some(room) = self.rooms.get_mut(room_id) else {
            return vec![Delivery::error(peer, "Room not found")];
        };
        room.peers.push(peer);
        room.paired = true;
        self.peer_rooms.insert(peer, room_id.to_string());
        log::info!("peer {peer} joined room {room_id}");

        out.extend(
            room.peers
                .iter()
                .map(|&p| Delivery::new(p, ServerEvent::RoomJoined)),
        );
        out
    }

    /// Forwards the snapshot to the other member of the addressed room.
    /// The snapshot itself is not inspected.
    pub fn relay_move(&mut self, peer: PeerId, outbound: OutboundMove) -> Vec<Delivery> {
        let room_id = normalize_room_id(&outbound.room_id);
        let Some(room) = self.rooms.get(room_id) else {
            return vec![Delivery::error(peer, "Room not found")];
        };
        if !room.peers.contains(&peer) {
            log::warn!("peer {peer} sent a move to room {room_id} it is not in");
            return vec![Delivery::error(peer, "Not a member of this room")];
        }

        let forwarded = InboundMove {
            payload: outbound.payload,
        };
        room.peers
            .iter()
            .filter(|&&p| p != peer)
            .map(|&p| Delivery::new(p, ServerEvent::Move(forwarded.clone())))
            .collect()
    }

    pub fn disconnect(&mut self, peer: PeerId) -> Vec<Delivery> {
        log::debug!("peer {peer} disconnected");
        self.leave(peer)
    }

    /// Drops rooms that waited longer than the TTL for a second player.
    /// Returns the removed room ids.
    pub fn prune_expired(&mut self, now: Instant) -> Vec<String> {
        let ttl = self.ttl;
        let expired: Vec<String> = self
            .rooms
            .iter()
            .filter(|(_, room)| {
                room.peers.len() < ROOM_CAPACITY
                    && now.saturating_duration_since(room.created_at) >= ttl
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(room) = self.rooms.remove(id) {
                for peer in room.peers {
                    self.peer_rooms.remove(&peer);
                }
            }
            log::info!("room {id} expired");
        }

        expired
    }

    fn leave(&mut self, peer: PeerId) -> Vec<Delivery> {
        let Some(room_id) = self.peer_rooms.remove(&peer) else {
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Vec::new();
        };

        room.peers.retain(|&p| p != peer);
        if !room.paired {
            if room.peers.is_empty() {
                self.rooms.remove(&room_id);
            }
            return Vec::new();
        }

        let Some(room) = self.rooms.remove(&room_id) else {
            return Vec::new();
        };
        log::info!("room {room_id} closed after peer {peer} left");
        room.peers
            .into_iter()
            .map(|p| {
                self.peer_rooms.remove(&p);
                Delivery::error(p, "Opponent disconnected")
            })
            .collect()
    }

    fn fresh_room_id(&mut self) -> String {
        loop {
            let id: String = (0..ROOM_ID_LEN)
                .map(|_| ROOM_ID_CHARSET[self.rng.gen_range(0..ROOM_ID_CHARSET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

fn normalize_room_id(room_id: &str) -> &str {
    room_id.trim()
}
