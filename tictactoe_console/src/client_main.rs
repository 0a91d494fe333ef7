use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::{cursor, event as term_event, execute, terminal};
use log::warn;
use scopeguard::defer;

use tictactoe::board::Cell;
use tictactoe::client::{ClientSession, EventError, NotableEvent};
use tictactoe::event::ServerEvent;

use crate::network::{CommunicationError, WsConnector};
use crate::tui;


pub struct ClientConfig {
    pub server_address: String,
    pub action: ClientAction,
}

pub enum ClientAction {
    Create { player_name: String, password: String },
    Join { room_id: String, player_name: String, password: String },
}

enum IncomingEvent {
    Network(Result<ServerEvent, CommunicationError>),
    Terminal(term_event::Event),
    Tick,
}

pub fn list_rooms(server_address: String) -> io::Result<()> {
    let (events_tx, _events_rx) = mpsc::channel();
    let connector = WsConnector::new(server_address, events_tx);
    let mut session = ClientSession::new();
    let rooms = session
        .fetch_room_list(&connector)
        .map_err(|err| io::Error::other(err.to_string()))?;
    if rooms.is_empty() {
        println!("No rooms are open for joining. Create one!");
    } else {
        for room in rooms {
            println!("{}  {}/2 players  created by {}", room.id, room.player_count, room.creator);
        }
    }
    Ok(())
}

pub fn run(config: ClientConfig) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();
    let (events_tx, events_rx) = mpsc::channel();
    let tx_net = tx.clone();
    thread::spawn(move || {
        for event in events_rx {
            if tx_net.send(IncomingEvent::Network(event)).is_err() {
                break;
            }
        }
    });
    let tx_local = tx.clone();
    thread::spawn(move || {
        loop {
            let ev = term_event::read().unwrap();
            if tx_local.send(IncomingEvent::Terminal(ev)).is_err() {
                break;
            }
        }
    });
    let tx_tick = tx;
    thread::spawn(move || {
        loop {
            thread::sleep(Duration::from_millis(100));
            if tx_tick.send(IncomingEvent::Tick).is_err() {
                break;
            }
        }
    });

    let connector = WsConnector::new(config.server_address.clone(), events_tx);
    let mut session = ClientSession::new();
    let connect_result = match &config.action {
        ClientAction::Create { player_name, password } => {
            session.create_room(&connector, player_name, password)
        }
        ClientAction::Join { room_id, player_name, password } => {
            session.join_room(&connector, room_id, player_name, password)
        }
    };
    if let Err(err) = connect_result {
        return Err(io::Error::other(err.to_string()));
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
    defer! {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
    }

    let mut status_message: Option<String> = None;
    tui::render(&mut stdout, &session, &status_message)?;
    for event in rx {
        match event {
            IncomingEvent::Network(Ok(event)) => {
                if let Err(EventError::ServerReturnedError(message)) =
                    session.process_server_event(event)
                {
                    warn!("Server returned error: {}", message);
                    status_message = Some(format!("Server error: {}", message));
                }
            }
            IncomingEvent::Network(Err(err)) => {
                warn!("{}", err);
                status_message = Some(err.to_string());
            }
            IncomingEvent::Terminal(event) => {
                if let term_event::Event::Key(key) = event {
                    match key.code {
                        term_event::KeyCode::Char(ch @ '1'..='9') => {
                            if let Some(cell) = Cell::new(ch as u8 - b'1') {
                                status_message = match session.make_turn(cell) {
                                    Ok(()) => None,
                                    Err(err) => Some(err.to_string()),
                                };
                            }
                        }
                        term_event::KeyCode::Char('r') => {
                            status_message = match session.request_rematch() {
                                Ok(()) => None,
                                Err(err) => Some(err.to_string()),
                            };
                        }
                        term_event::KeyCode::Char('s') => {
                            status_message = match session.request_current_state() {
                                Ok(()) => None,
                                Err(err) => Some(err.to_string()),
                            };
                        }
                        term_event::KeyCode::Char('q') | term_event::KeyCode::Esc => {
                            session.return_to_home();
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
            IncomingEvent::Tick => {
                // Any event triggers repaint, so no additional action is required.
            }
        }

        let mut disconnect_message = None;
        while let Some(event) = session.next_notable_event() {
            match event {
                NotableEvent::GameRestarted => {
                    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                    status_message = None;
                }
                NotableEvent::RematchPending { requested_by, waiting_on } => {
                    let i_accepted = session
                        .player_name()
                        .is_some_and(|name| session.rematch_acceptors().contains(name));
                    status_message = Some(if i_accepted {
                        match &waiting_on {
                            Some(name) => format!("Rematch requested, waiting for {}", name),
                            None => "Rematch requested".to_owned(),
                        }
                    } else {
                        format!("{} wants a rematch. Press r to accept.", requested_by)
                    });
                }
                NotableEvent::PlayerDisconnected(message) => {
                    disconnect_message = Some(message);
                }
                NotableEvent::RoomCreated(_)
                | NotableEvent::JoinedRoom
                | NotableEvent::RoomUpdated
                | NotableEvent::BoardUpdated
                | NotableEvent::RoomListReady(_) => {}
            }
        }
        if let Some(message) = disconnect_message {
            execute!(stdout, terminal::LeaveAlternateScreen)?;
            terminal::disable_raw_mode()?;
            println!("{}", message);
            return Ok(());
        }
        tui::render(&mut stdout, &session, &status_message)?;
    }
    panic!("Unexpected end of events stream");
}
