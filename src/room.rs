use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::board::{Board, GamePhase, Symbol};


// Win counts per player name, for the lifetime of the room.
pub type Scoreboard = HashMap<String, u32>;

// Full server-side room state. The server owns it; the client replaces its
// mirrored fields wholesale on every snapshot and never mutates them locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub players: Vec<String>,
    pub symbols: HashMap<String, Symbol>,
    pub board: Board,
    pub turn: Symbol,
    pub phase: GamePhase,
    #[serde(default)]
    pub winner: Option<String>,
    pub scoreboard: Scoreboard,
    pub games_played: u32,
}

// A room open for joining, as shown in the room list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDescription {
    pub id: String,
    pub players: Vec<String>,
    pub creator: String,
    pub player_count: u32,
}
