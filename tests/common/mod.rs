// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use std::cell::RefCell;
use std::rc::Rc;

use tictactoe::board::{Board, GamePhase, Symbol};
use tictactoe::event::ClientEvent;
use tictactoe::room::{RoomDescription, RoomSnapshot};
use tictactoe::transport::{Connect, ConnectionError, RoomSelector, Transport};


// Parses a board from a compact string, e.g. "XOX......" ('.' = free cell).
#[allow(dead_code)]
pub fn parse_board(board_str: &str) -> Board {
    let cells = board_str
        .chars()
        .map(|ch| match ch {
            '.' => String::new(),
            ch => ch.to_string(),
        })
        .collect::<Vec<_>>();
    Board::try_from(cells).unwrap()
}

#[allow(dead_code)]
pub fn room_snapshot(
    players: &[(&str, Symbol)], board_str: &str, turn: Symbol, phase: GamePhase,
) -> RoomSnapshot {
    RoomSnapshot {
        players: players.iter().map(|(name, _)| name.to_string()).collect(),
        symbols: players.iter().map(|(name, symbol)| (name.to_string(), *symbol)).collect(),
        board: parse_board(board_str),
        turn,
        phase,
        winner: None,
        scoreboard: players.iter().map(|(name, _)| (name.to_string(), 0)).collect(),
        games_played: 0,
    }
}

#[allow(dead_code)]
pub fn room_description(id: &str, creator: &str) -> RoomDescription {
    RoomDescription {
        id: id.to_owned(),
        players: vec![creator.to_owned()],
        creator: creator.to_owned(),
        player_count: 1,
    }
}


// Everything the fake server observed: events sent by the client and
// whether the client hung up.
#[derive(Default)]
pub struct SentLog {
    pub events: Vec<ClientEvent>,
    pub closed: bool,
}

pub struct FakeTransport {
    log: Rc<RefCell<SentLog>>,
}

impl Transport for FakeTransport {
    fn send(&mut self, event: &ClientEvent) -> Result<(), ConnectionError> {
        let mut log = self.log.borrow_mut();
        if log.closed {
            return Err(ConnectionError::Send("connection is closed".to_owned()));
        }
        log.events.push(event.clone());
        Ok(())
    }

    fn close(&mut self) { self.log.borrow_mut().closed = true; }
}

#[derive(Default)]
pub struct FakeConnector {
    log: Rc<RefCell<SentLog>>,
    connects: RefCell<Vec<(RoomSelector, String)>>,
    rooms: Vec<RoomDescription>,
}

impl FakeConnector {
    #[allow(dead_code)]
    pub fn new() -> Self { Self::default() }

    #[allow(dead_code)]
    pub fn with_rooms(rooms: Vec<RoomDescription>) -> Self {
        FakeConnector { rooms, ..Self::default() }
    }

    #[allow(dead_code)]
    pub fn sent_events(&self) -> Vec<ClientEvent> { self.log.borrow().events.clone() }

    #[allow(dead_code)]
    pub fn is_closed(&self) -> bool { self.log.borrow().closed }

    #[allow(dead_code)]
    pub fn connect_count(&self) -> usize { self.connects.borrow().len() }

    #[allow(dead_code)]
    pub fn connect_log(&self) -> Vec<(RoomSelector, String)> { self.connects.borrow().clone() }
}

impl Connect for FakeConnector {
    fn connect(
        &self, selector: RoomSelector, player_name: &str,
    ) -> Result<Box<dyn Transport>, ConnectionError> {
        self.connects.borrow_mut().push((selector, player_name.to_owned()));
        self.log.borrow_mut().closed = false;
        Ok(Box::new(FakeTransport { log: Rc::clone(&self.log) }))
    }

    fn fetch_rooms(&self) -> Result<Vec<RoomDescription>, ConnectionError> {
        Ok(self.rooms.clone())
    }
}
