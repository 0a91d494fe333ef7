use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use log::{debug, warn};

use crate::board::{Board, Cell, GamePhase, Symbol};
use crate::event::{ClientEvent, ServerEvent};
use crate::room::{RoomDescription, RoomSnapshot, Scoreboard};
use crate::transport::{Connect, ConnectionError, RoomSelector, Transport};


#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    EmptyPlayerName,
    EmptyRoomId,
    EmptyPassword,
    NotConnected,
    Connection(ConnectionError),
}

impl From<ConnectionError> for CommandError {
    fn from(err: ConnectionError) -> Self { CommandError::Connection(err) }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::EmptyPlayerName => write!(f, "Please enter your name"),
            CommandError::EmptyRoomId => write!(f, "Please enter a room id"),
            CommandError::EmptyPassword => write!(f, "Please enter the room password"),
            CommandError::NotConnected => write!(f, "Not connected to the server"),
            CommandError::Connection(err) => write!(f, "{}", err),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnCommandError {
    NoSymbolAssigned,
    NotYourTurn,
    GameNotInProgress,
    CellOccupied,
    NotConnected,
}

impl fmt::Display for TurnCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnCommandError::NoSymbolAssigned => write!(f, "You have no symbol assigned yet"),
            TurnCommandError::NotYourTurn => write!(f, "It is not your turn"),
            TurnCommandError::GameNotInProgress => write!(f, "The game is not in progress"),
            TurnCommandError::CellOccupied => write!(f, "This cell is already occupied"),
            TurnCommandError::NotConnected => write!(f, "Not connected to the server"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventError {
    ServerReturnedError(String),
}

// Screen-level happenings the front-end cannot derive from steady-state
// rendering alone.
#[derive(Clone, Debug, PartialEq)]
pub enum NotableEvent {
    RoomCreated(String),
    JoinedRoom,
    RoomUpdated,
    BoardUpdated,
    RoomListReady(Vec<RoomDescription>),
    RematchPending {
        requested_by: String,
        waiting_on: Option<String>,
    },
    GameRestarted,
    PlayerDisconnected(String),
}

// Client-side mirror of one player's match session. Owned by the front-end
// and passed by reference to input adapters; there are no globals.
//
// Every game field holds the last value reported by the server. The session
// never advances them speculatively: commands only send a request, and the
// confirmation arrives later through `process_server_event`.
pub struct ClientSession {
    connection: Option<Box<dyn Transport>>,
    room_id: Option<String>,
    player_name: Option<String>,
    my_symbol: Option<Symbol>,
    current_turn: Option<Symbol>,
    game_phase: Option<GamePhase>,
    winner: Option<String>,
    board: Board,
    players: Vec<String>,
    symbols: HashMap<String, Symbol>,
    scoreboard: Scoreboard,
    games_played: u32,
    rematch_acceptors: HashSet<String>,
    notable_events: VecDeque<NotableEvent>,
}

impl ClientSession {
    pub fn new() -> Self {
        ClientSession {
            connection: None,
            room_id: None,
            player_name: None,
            my_symbol: None,
            current_turn: None,
            game_phase: None,
            winner: None,
            board: Board::empty(),
            players: Vec::new(),
            symbols: HashMap::new(),
            scoreboard: Scoreboard::new(),
            games_played: 0,
            rematch_acceptors: HashSet::new(),
            notable_events: VecDeque::new(),
        }
    }

    pub fn is_connected(&self) -> bool { self.connection.is_some() }
    pub fn room_id(&self) -> Option<&str> { self.room_id.as_deref() }
    pub fn player_name(&self) -> Option<&str> { self.player_name.as_deref() }
    pub fn my_symbol(&self) -> Option<Symbol> { self.my_symbol }
    pub fn current_turn(&self) -> Option<Symbol> { self.current_turn }
    pub fn game_phase(&self) -> Option<GamePhase> { self.game_phase }
    pub fn winner(&self) -> Option<&str> { self.winner.as_deref() }
    pub fn board(&self) -> &Board { &self.board }
    pub fn players(&self) -> &[String] { &self.players }
    pub fn symbols(&self) -> &HashMap<String, Symbol> { &self.symbols }
    pub fn scoreboard(&self) -> &Scoreboard { &self.scoreboard }
    pub fn games_played(&self) -> u32 { self.games_played }
    pub fn rematch_acceptors(&self) -> &HashSet<String> { &self.rematch_acceptors }

    pub fn is_my_turn(&self) -> bool {
        self.my_symbol.is_some() && self.my_symbol == self.current_turn
    }
    pub fn waiting_for_opponent(&self) -> bool {
        self.game_phase == Some(GamePhase::Waiting) && self.players.len() == 1
    }
    pub fn rematch_available(&self) -> bool {
        matches!(self.game_phase, Some(GamePhase::Finished | GamePhase::Draw))
    }

    pub fn next_notable_event(&mut self) -> Option<NotableEvent> {
        self.notable_events.pop_front()
    }

    pub fn create_room(
        &mut self, connector: &dyn Connect, player_name: &str, password: &str,
    ) -> Result<(), CommandError> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(CommandError::EmptyPlayerName);
        }
        let connection = connector.connect(RoomSelector::Create, player_name)?;
        // Replacing the handle invalidates any previous connection.
        self.connection = Some(connection);
        self.player_name = Some(player_name.to_owned());
        self.send(ClientEvent::CreateRoom {
            password: password.to_owned(),
            player_name: player_name.to_owned(),
        })
    }

    pub fn join_room(
        &mut self, connector: &dyn Connect, room_id: &str, player_name: &str, password: &str,
    ) -> Result<(), CommandError> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(CommandError::EmptyPlayerName);
        }
        if room_id.is_empty() {
            return Err(CommandError::EmptyRoomId);
        }
        if password.is_empty() {
            return Err(CommandError::EmptyPassword);
        }
        let connection = connector.connect(RoomSelector::Room(room_id.to_owned()), player_name)?;
        self.connection = Some(connection);
        self.player_name = Some(player_name.to_owned());
        self.room_id = Some(room_id.to_owned());
        self.send(ClientEvent::JoinRoom {
            password: password.to_owned(),
            player_name: player_name.to_owned(),
        })
    }

    // Preconditions are checked against the last authoritative board
    // snapshot, never against whatever the renderer currently shows.
    pub fn make_turn(&mut self, cell: Cell) -> Result<(), TurnCommandError> {
        let Some(my_symbol) = self.my_symbol else {
            return Err(TurnCommandError::NoSymbolAssigned);
        };
        if self.current_turn != Some(my_symbol) {
            return Err(TurnCommandError::NotYourTurn);
        }
        if self.game_phase != Some(GamePhase::Playing) {
            return Err(TurnCommandError::GameNotInProgress);
        }
        if !self.board.is_free(cell) {
            return Err(TurnCommandError::CellOccupied);
        }
        let connection = self.connection.as_mut().ok_or(TurnCommandError::NotConnected)?;
        connection
            .send(&ClientEvent::Move { position: cell })
            .map_err(|_| TurnCommandError::NotConnected)
    }

    pub fn request_rematch(&mut self) -> Result<(), CommandError> {
        self.send(ClientEvent::RequestRematch)
    }

    pub fn request_current_state(&mut self) -> Result<(), CommandError> {
        self.send(ClientEvent::GetState)
    }

    // Uses a short-lived secondary connection owned by the connector; the
    // primary connection and all room fields stay untouched.
    pub fn fetch_room_list(
        &mut self, connector: &dyn Connect,
    ) -> Result<Vec<RoomDescription>, CommandError> {
        let rooms = connector.fetch_rooms()?;
        self.notable_events.push_back(NotableEvent::RoomListReady(rooms.clone()));
        Ok(rooms)
    }

    // The sole teardown path. Safe to call at any moment, including when
    // already at home.
    pub fn return_to_home(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
        self.room_id = None;
        self.player_name = None;
        self.my_symbol = None;
        self.current_turn = None;
        self.game_phase = None;
        self.winner = None;
        self.board = Board::empty();
        self.players.clear();
        self.symbols.clear();
        self.scoreboard.clear();
        self.games_played = 0;
        self.rematch_acceptors.clear();
        self.notable_events.clear();
    }

    pub fn process_server_event(&mut self, event: ServerEvent) -> Result<(), EventError> {
        use ServerEvent::*;
        match event {
            RoomCreated { room_id } => {
                self.room_id = Some(room_id.clone());
                self.my_symbol = Some(Symbol::X);
                self.notable_events.push_back(NotableEvent::RoomCreated(room_id));
            }
            JoinedSuccessfully { room, your_symbol } => {
                self.my_symbol = Some(your_symbol);
                self.apply_room_snapshot(room);
                self.notable_events.push_back(NotableEvent::JoinedRoom);
            }
            StateUpdated { room } => {
                self.apply_room_snapshot(room);
                self.notable_events.push_back(NotableEvent::RoomUpdated);
            }
            BoardUpdated { board, turn, phase, winner, scoreboard, games_played } => {
                self.board = board;
                self.current_turn = Some(turn);
                self.game_phase = Some(phase);
                self.winner = winner;
                self.scoreboard = scoreboard;
                self.games_played = games_played;
                self.notable_events.push_back(NotableEvent::BoardUpdated);
            }
            CurrentState { room, your_symbol, scoreboard, games_played } => {
                self.my_symbol = Some(your_symbol);
                self.apply_room_snapshot(room);
                self.scoreboard = scoreboard;
                self.games_played = games_played;
                self.notable_events.push_back(NotableEvent::RoomUpdated);
            }
            RoomList { rooms } => {
                self.notable_events.push_back(NotableEvent::RoomListReady(rooms));
            }
            RematchPending { requested_by, waiting_on, accepted } => {
                self.rematch_acceptors = accepted.into_iter().collect();
                self.notable_events
                    .push_back(NotableEvent::RematchPending { requested_by, waiting_on });
            }
            GameRestarted { room, scoreboard } => {
                match self.player_name.as_ref().and_then(|name| room.symbols.get(name)) {
                    Some(&symbol) => self.my_symbol = Some(symbol),
                    None => warn!("Restarted room does not mention the local player"),
                }
                self.apply_room_snapshot(room);
                self.scoreboard = scoreboard;
                self.rematch_acceptors.clear();
                self.notable_events.push_back(NotableEvent::GameRestarted);
            }
            PlayerDisconnected { message } => {
                // Forced teardown: the room is gone for us once the opponent
                // leaves.
                self.return_to_home();
                self.notable_events.push_back(NotableEvent::PlayerDisconnected(message));
            }
            Error { message } => {
                return Err(EventError::ServerReturnedError(message));
            }
            Unknown => {
                debug!("Ignoring unknown server event");
            }
        }
        Ok(())
    }

    // Full refresh: replace every mirrored room field wholesale. Re-applying
    // the same snapshot is a no-op, so repeated or out-of-order phase reports
    // are harmless.
    fn apply_room_snapshot(&mut self, room: RoomSnapshot) {
        if let Some(name) = &self.player_name {
            if let Some(&symbol) = room.symbols.get(name) {
                self.my_symbol = Some(symbol);
            }
        }
        self.players = room.players;
        self.symbols = room.symbols;
        self.board = room.board;
        self.current_turn = Some(room.turn);
        self.game_phase = Some(room.phase);
        self.winner = room.winner;
        self.scoreboard = room.scoreboard;
        self.games_played = room.games_played;
    }

    fn send(&mut self, event: ClientEvent) -> Result<(), CommandError> {
        let connection = self.connection.as_mut().ok_or(CommandError::NotConnected)?;
        connection.send(&event)?;
        Ok(())
    }
}
