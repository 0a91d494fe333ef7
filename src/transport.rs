use std::fmt;

use crate::event::ClientEvent;
use crate::room::RoomDescription;


// Path sentinels understood by the server's connection endpoint.
pub const CREATE_ROOM_SELECTOR: &str = "new";
pub const LIST_ROOMS_SELECTOR: &str = "list";
pub const LIST_ROOMS_PLAYER: &str = "rooms";

// What a connection is for: joining a real room, creating a room, or
// fetching the room list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomSelector {
    Create,
    List,
    Room(String),
}

impl RoomSelector {
    pub fn path_segment(&self) -> &str {
        match self {
            RoomSelector::Create => CREATE_ROOM_SELECTOR,
            RoomSelector::List => LIST_ROOMS_SELECTOR,
            RoomSelector::Room(id) => id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionError {
    Connect(String),
    Send(String),
    Receive(String),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Connect(details) => {
                write!(f, "Cannot connect to the server: {}", details)
            }
            ConnectionError::Send(details) => write!(f, "Cannot send to the server: {}", details),
            ConnectionError::Receive(details) => {
                write!(f, "Cannot read from the server: {}", details)
            }
        }
    }
}

// An established outgoing channel to the server. The session holds at most
// one; dropping the handle must release the underlying connection.
pub trait Transport {
    fn send(&mut self, event: &ClientEvent) -> Result<(), ConnectionError>;
    fn close(&mut self);
}

pub trait Connect {
    // Returns once the transport is ready to send.
    fn connect(
        &self, selector: RoomSelector, player_name: &str,
    ) -> Result<Box<dyn Transport>, ConnectionError>;

    // Opens a short-lived connection, asks for the room list and closes the
    // connection on every exit path, successful or not.
    fn fetch_rooms(&self) -> Result<Vec<RoomDescription>, ConnectionError>;
}
