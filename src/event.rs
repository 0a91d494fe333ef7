use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell, GamePhase, Symbol};
use crate::room::{RoomDescription, RoomSnapshot, Scoreboard};


#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientEvent {
    CreateRoom {
        password: String,
        player_name: String,
    },
    JoinRoom {
        password: String,
        player_name: String,
    },
    Move {
        position: Cell,
    },
    RequestRematch,
    // Asks the server to resend the full room state, e.g. after a reconnect.
    GetState,
    ListRooms,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomCreated {
        room_id: String,
    },
    JoinedSuccessfully {
        room: RoomSnapshot,
        your_symbol: Symbol,
    },
    StateUpdated {
        room: RoomSnapshot,
    },
    BoardUpdated {
        board: Board,
        turn: Symbol,
        phase: GamePhase,
        #[serde(default)]
        winner: Option<String>,
        scoreboard: Scoreboard,
        games_played: u32,
    },
    // Sent in response to `GetState`; carries everything needed to resync.
    CurrentState {
        room: RoomSnapshot,
        your_symbol: Symbol,
        scoreboard: Scoreboard,
        games_played: u32,
    },
    RoomList {
        rooms: Vec<RoomDescription>,
    },
    RematchPending {
        requested_by: String,
        #[serde(default)]
        waiting_on: Option<String>,
        accepted: Vec<String>,
    },
    GameRestarted {
        room: RoomSnapshot,
        scoreboard: Scoreboard,
    },
    PlayerDisconnected {
        message: String,
    },
    Error {
        message: String,
    },
    // Event kinds added by newer servers deserialize here and are ignored.
    #[serde(other)]
    Unknown,
}
