use std::fmt;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;

use itertools::Itertools;
use serde::{Serialize, de};
use tungstenite::protocol::Role;
use tungstenite::{Message, WebSocket};
use url::Url;

use tictactoe::event::{ClientEvent, ServerEvent};
use tictactoe::room::RoomDescription;
use tictactoe::transport::{
    Connect, ConnectionError, LIST_ROOMS_PLAYER, RoomSelector, Transport,
};


pub const PORT: u16 = 8000;


#[derive(Debug)]
pub enum CommunicationError {
    Socket(tungstenite::Error),
    Serde(serde_json::Error),
    Protocol(String),
}

impl fmt::Display for CommunicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunicationError::Socket(err) => write!(f, "Connection problem: {}", err),
            CommunicationError::Serde(err) => write!(f, "Malformed server message: {}", err),
            CommunicationError::Protocol(details) => write!(f, "Protocol error: {}", details),
        }
    }
}

pub fn write_obj<T, S>(socket: &mut WebSocket<S>, obj: &T) -> Result<(), CommunicationError>
where
    T: Serialize,
    S: io::Read + io::Write,
{
    let serialized = serde_json::to_string(obj).map_err(CommunicationError::Serde)?;
    socket.send(Message::Text(serialized.into())).map_err(CommunicationError::Socket)
}

pub fn read_obj<T, S>(socket: &mut WebSocket<S>) -> Result<T, CommunicationError>
where
    T: de::DeserializeOwned,
    S: io::Read + io::Write,
{
    loop {
        let message = socket.read().map_err(CommunicationError::Socket)?;
        match message {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).map_err(CommunicationError::Serde);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            other => {
                return Err(CommunicationError::Protocol(format!(
                    "Expected a text frame, got {:?}",
                    other
                )));
            }
        }
    }
}

// Read and write halves share the underlying stream, so the reader thread
// and the session can use the connection independently.
pub fn clone_websocket(
    socket: &WebSocket<TcpStream>, role: Role,
) -> io::Result<WebSocket<TcpStream>> {
    let stream = socket.get_ref().try_clone()?;
    let config = *socket.get_config();
    Ok(WebSocket::from_raw_socket(stream, role, Some(config)))
}

fn open_socket(
    server_address: &str, selector: &RoomSelector, player_name: &str,
) -> Result<WebSocket<TcpStream>, ConnectionError> {
    let addrs = (server_address, PORT)
        .to_socket_addrs()
        .map_err(|err| ConnectionError::Connect(err.to_string()))?
        .collect_vec();
    let stream =
        TcpStream::connect(&addrs[..]).map_err(|err| ConnectionError::Connect(err.to_string()))?;
    let url = Url::parse(&format!(
        "ws://{}:{}/ws/{}/{}",
        server_address,
        PORT,
        selector.path_segment(),
        player_name
    ))
    .map_err(|err| ConnectionError::Connect(err.to_string()))?;
    let (socket, _) =
        tungstenite::client(url, stream).map_err(|err| ConnectionError::Connect(err.to_string()))?;
    Ok(socket)
}

fn reader_loop(
    mut socket: WebSocket<TcpStream>,
    events_tx: mpsc::Sender<Result<ServerEvent, CommunicationError>>,
) {
    loop {
        let message = match socket.read() {
            Ok(message) => message,
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => break,
            Err(err) => {
                let _ = events_tx.send(Err(CommunicationError::Socket(err)));
                break;
            }
        };
        match message {
            Message::Text(text) => {
                let event = serde_json::from_str(text.as_str()).map_err(CommunicationError::Serde);
                if events_tx.send(event).is_err() {
                    break;
                }
            }
            // The close confirmation arrives as an error on the next read.
            Message::Close(_) => {}
            _ => {}
        }
    }
}

pub struct WsTransport {
    socket: WebSocket<TcpStream>,
}

impl Transport for WsTransport {
    fn send(&mut self, event: &ClientEvent) -> Result<(), ConnectionError> {
        write_obj(&mut self.socket, event).map_err(|err| ConnectionError::Send(err.to_string()))
    }

    fn close(&mut self) {
        let _ = self.socket.close(None);
        let _ = self.socket.flush();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct WsConnector {
    server_address: String,
    events_tx: mpsc::Sender<Result<ServerEvent, CommunicationError>>,
}

impl WsConnector {
    pub fn new(
        server_address: String,
        events_tx: mpsc::Sender<Result<ServerEvent, CommunicationError>>,
    ) -> Self {
        WsConnector { server_address, events_tx }
    }
}

impl Connect for WsConnector {
    fn connect(
        &self, selector: RoomSelector, player_name: &str,
    ) -> Result<Box<dyn Transport>, ConnectionError> {
        let socket_in = open_socket(&self.server_address, &selector, player_name)?;
        let socket_out = clone_websocket(&socket_in, Role::Client)
            .map_err(|err| ConnectionError::Connect(err.to_string()))?;
        let events_tx = self.events_tx.clone();
        thread::spawn(move || reader_loop(socket_in, events_tx));
        Ok(Box::new(WsTransport { socket: socket_out }))
    }

    fn fetch_rooms(&self) -> Result<Vec<RoomDescription>, ConnectionError> {
        let socket = open_socket(&self.server_address, &RoomSelector::List, LIST_ROOMS_PLAYER)?;
        // The listing connection must not outlive one request, whatever the
        // outcome below.
        let mut socket = scopeguard::guard(socket, |mut socket| {
            let _ = socket.close(None);
            let _ = socket.flush();
        });
        write_obj(&mut *socket, &ClientEvent::ListRooms)
            .map_err(|err| ConnectionError::Send(err.to_string()))?;
        loop {
            match read_obj::<ServerEvent, _>(&mut *socket) {
                Ok(ServerEvent::RoomList { rooms }) => return Ok(rooms),
                Ok(ServerEvent::Error { message }) => return Err(ConnectionError::Receive(message)),
                // Anything else on the listing connection is noise.
                Ok(_) => {}
                Err(err) => return Err(ConnectionError::Receive(err.to_string())),
            }
        }
    }
}
