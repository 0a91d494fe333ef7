mod common;

use common::*;
use pretty_assertions::assert_eq;
use tictactoe::board::{Board, Cell, GamePhase, Symbol};
use tictactoe::client::{ClientSession, CommandError, EventError, NotableEvent, TurnCommandError};
use tictactoe::event::{ClientEvent, ServerEvent};
use tictactoe::transport::RoomSelector;


fn cell(index: u8) -> Cell { Cell::new(index).unwrap() }

fn board_updated(board_str: &str, turn: Symbol, phase: GamePhase) -> ServerEvent {
    ServerEvent::BoardUpdated {
        board: parse_board(board_str),
        turn,
        phase,
        winner: None,
        scoreboard: [("Alice".to_owned(), 1), ("Bob".to_owned(), 0)].into_iter().collect(),
        games_played: 1,
    }
}

// Joins a two-player room and drains the join traffic from expectations.
fn join_as(connector: &FakeConnector, name: &str, symbol: Symbol) -> ClientSession {
    let mut session = ClientSession::new();
    session.join_room(connector, "room42", name, "pw").unwrap();
    let room = room_snapshot(
        &[("Alice", Symbol::X), ("Bob", Symbol::O)],
        ".........",
        Symbol::X,
        GamePhase::Playing,
    );
    session
        .process_server_event(ServerEvent::JoinedSuccessfully { room, your_symbol: symbol })
        .unwrap();
    session
}

fn sent_moves(connector: &FakeConnector) -> Vec<ClientEvent> {
    connector
        .sent_events()
        .into_iter()
        .filter(|event| matches!(event, ClientEvent::Move { .. }))
        .collect()
}


#[test]
fn create_room_with_empty_name_fails_before_connecting() {
    let connector = FakeConnector::new();
    let mut session = ClientSession::new();
    assert_eq!(session.create_room(&connector, "  ", "pw"), Err(CommandError::EmptyPlayerName));
    assert_eq!(connector.connect_count(), 0);
    assert!(!session.is_connected());
}

#[test]
fn join_room_validates_every_field_before_connecting() {
    let connector = FakeConnector::new();
    let mut session = ClientSession::new();
    assert_eq!(
        session.join_room(&connector, "room42", "", "pw"),
        Err(CommandError::EmptyPlayerName)
    );
    assert_eq!(session.join_room(&connector, "", "Alice", "pw"), Err(CommandError::EmptyRoomId));
    assert_eq!(
        session.join_room(&connector, "room42", "Alice", ""),
        Err(CommandError::EmptyPassword)
    );
    assert_eq!(connector.connect_count(), 0);
}

#[test]
fn create_room_connects_with_creation_sentinel_and_sends_request() {
    let connector = FakeConnector::new();
    let mut session = ClientSession::new();
    session.create_room(&connector, " Alice ", "secret").unwrap();
    assert_eq!(connector.connect_log(), vec![(RoomSelector::Create, "Alice".to_owned())]);
    assert_eq!(
        connector.sent_events(),
        vec![ClientEvent::CreateRoom {
            password: "secret".to_owned(),
            player_name: "Alice".to_owned(),
        }]
    );
    assert_eq!(session.player_name(), Some("Alice"));
}

#[test]
fn room_created_assigns_room_and_crosses() {
    let connector = FakeConnector::new();
    let mut session = ClientSession::new();
    session.create_room(&connector, "Alice", "secret").unwrap();
    session
        .process_server_event(ServerEvent::RoomCreated { room_id: "abc123".to_owned() })
        .unwrap();
    assert_eq!(session.room_id(), Some("abc123"));
    assert_eq!(session.my_symbol(), Some(Symbol::X));
    assert_eq!(
        session.next_notable_event(),
        Some(NotableEvent::RoomCreated("abc123".to_owned()))
    );
}

#[test]
fn symbol_never_changes_on_board_updates() {
    let connector = FakeConnector::new();
    let mut session = ClientSession::new();
    session.join_room(&connector, "room42", "Bob", "pw").unwrap();

    // Board updates may arrive before the join confirmation; they must not
    // invent a symbol.
    session
        .process_server_event(board_updated("X........", Symbol::O, GamePhase::Playing))
        .unwrap();
    assert_eq!(session.my_symbol(), None);

    let room = room_snapshot(
        &[("Alice", Symbol::X), ("Bob", Symbol::O)],
        "X........",
        Symbol::O,
        GamePhase::Playing,
    );
    session
        .process_server_event(ServerEvent::JoinedSuccessfully { room, your_symbol: Symbol::O })
        .unwrap();
    assert_eq!(session.my_symbol(), Some(Symbol::O));

    session
        .process_server_event(board_updated("XO.......", Symbol::X, GamePhase::Playing))
        .unwrap();
    assert_eq!(session.my_symbol(), Some(Symbol::O));
}

#[test]
fn make_turn_requires_an_assigned_symbol() {
    let connector = FakeConnector::new();
    let mut session = ClientSession::new();
    session.join_room(&connector, "room42", "Bob", "pw").unwrap();
    assert_eq!(session.make_turn(cell(0)), Err(TurnCommandError::NoSymbolAssigned));
    assert_eq!(sent_moves(&connector), vec![]);
}

#[test]
fn make_turn_on_own_turn_sends_exactly_one_move() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);
    session
        .process_server_event(board_updated("XOX......", Symbol::O, GamePhase::Playing))
        .unwrap();
    assert_eq!(session.current_turn(), Some(Symbol::O));
    session.make_turn(cell(3)).unwrap();
    assert_eq!(sent_moves(&connector), vec![ClientEvent::Move { position: cell(3) }]);
}

#[test]
fn make_turn_on_opponents_turn_sends_nothing() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);
    session
        .process_server_event(board_updated("XOX......", Symbol::X, GamePhase::Playing))
        .unwrap();
    for index in 0..Cell::COUNT {
        assert_eq!(session.make_turn(cell(index)), Err(TurnCommandError::NotYourTurn));
    }
    assert_eq!(sent_moves(&connector), vec![]);
}

#[test]
fn make_turn_rejects_finished_games_and_occupied_cells() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);

    session
        .process_server_event(board_updated("XOX......", Symbol::O, GamePhase::Finished))
        .unwrap();
    assert_eq!(session.make_turn(cell(3)), Err(TurnCommandError::GameNotInProgress));

    session
        .process_server_event(board_updated("XOX......", Symbol::O, GamePhase::Playing))
        .unwrap();
    assert_eq!(session.make_turn(cell(1)), Err(TurnCommandError::CellOccupied));

    assert_eq!(sent_moves(&connector), vec![]);
}

#[test]
fn return_to_home_is_idempotent() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);
    session
        .process_server_event(board_updated("XOX......", Symbol::O, GamePhase::Playing))
        .unwrap();

    session.return_to_home();
    assert!(connector.is_closed());
    session.return_to_home();

    assert!(!session.is_connected());
    assert_eq!(session.room_id(), None);
    assert_eq!(session.player_name(), None);
    assert_eq!(session.my_symbol(), None);
    assert_eq!(session.current_turn(), None);
    assert_eq!(session.game_phase(), None);
    assert_eq!(session.board(), &Board::empty());
    assert!(session.players().is_empty());
    assert!(session.scoreboard().is_empty());
    assert_eq!(session.games_played(), 0);
    assert!(session.rematch_acceptors().is_empty());
    assert_eq!(session.next_notable_event(), None);
}

#[test]
fn commands_after_teardown_report_missing_connection() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);
    session
        .process_server_event(board_updated("XOX......", Symbol::O, GamePhase::Playing))
        .unwrap();
    session.return_to_home();
    assert_eq!(session.request_rematch(), Err(CommandError::NotConnected));
    assert_eq!(session.make_turn(cell(3)), Err(TurnCommandError::NoSymbolAssigned));
}

#[test]
fn game_restart_reassigns_symbol_and_clears_rematch_votes() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Alice", Symbol::X);

    session
        .process_server_event(ServerEvent::RematchPending {
            requested_by: "Bob".to_owned(),
            waiting_on: Some("Alice".to_owned()),
            accepted: vec!["Bob".to_owned()],
        })
        .unwrap();
    assert!(session.rematch_acceptors().contains("Bob"));

    // The server swaps symbols between games; the client must pick its new
    // one from the snapshot's symbol map.
    let room = room_snapshot(
        &[("Alice", Symbol::O), ("Bob", Symbol::X)],
        ".........",
        Symbol::X,
        GamePhase::Playing,
    );
    session
        .process_server_event(ServerEvent::GameRestarted {
            room,
            scoreboard: [("Alice".to_owned(), 2), ("Bob".to_owned(), 1)].into_iter().collect(),
        })
        .unwrap();
    assert_eq!(session.my_symbol(), Some(Symbol::O));
    assert!(session.rematch_acceptors().is_empty());
    assert_eq!(session.scoreboard().get("Alice"), Some(&2));
}

#[test]
fn player_disconnection_forces_teardown() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);
    session
        .process_server_event(ServerEvent::PlayerDisconnected {
            message: "Alice has disconnected".to_owned(),
        })
        .unwrap();
    assert!(!session.is_connected());
    assert!(connector.is_closed());
    assert_eq!(session.room_id(), None);
    assert_eq!(
        session.next_notable_event(),
        Some(NotableEvent::PlayerDisconnected("Alice has disconnected".to_owned()))
    );
    assert_eq!(session.next_notable_event(), None);
}

#[test]
fn server_error_is_surfaced_without_touching_state() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);
    let result = session.process_server_event(ServerEvent::Error {
        message: "Incorrect password".to_owned(),
    });
    assert_eq!(
        result,
        Err(EventError::ServerReturnedError("Incorrect password".to_owned()))
    );
    assert_eq!(session.my_symbol(), Some(Symbol::O));
    assert_eq!(session.room_id(), Some("room42"));
}

#[test]
fn room_list_fetch_leaves_the_session_untouched() {
    let connector =
        FakeConnector::with_rooms(vec![room_description("room1", "Alice")]);
    let mut session = join_as(&connector, "Bob", Symbol::O);

    let rooms = session.fetch_room_list(&connector).unwrap();
    assert_eq!(rooms, vec![room_description("room1", "Alice")]);
    assert_eq!(session.my_symbol(), Some(Symbol::O));
    assert_eq!(session.room_id(), Some("room42"));
    assert!(!connector.is_closed());

    // Drain the join notification first.
    assert_eq!(session.next_notable_event(), Some(NotableEvent::JoinedRoom));
    assert_eq!(session.next_notable_event(), Some(NotableEvent::RoomListReady(rooms)));
}

#[test]
fn unknown_server_events_are_ignored() {
    let event: ServerEvent =
        serde_json::from_str(r#"{"kind": "server_maintenance", "at": "soon"}"#).unwrap();
    assert_eq!(event, ServerEvent::Unknown);

    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);
    session.process_server_event(event).unwrap();
    assert_eq!(session.my_symbol(), Some(Symbol::O));
    assert_eq!(session.room_id(), Some("room42"));
}

#[test]
fn repeated_phase_reports_are_harmless() {
    let connector = FakeConnector::new();
    let mut session = join_as(&connector, "Bob", Symbol::O);
    for _ in 0..3 {
        session
            .process_server_event(board_updated("XOX......", Symbol::O, GamePhase::Finished))
            .unwrap();
    }
    assert_eq!(session.game_phase(), Some(GamePhase::Finished));
    assert!(session.rematch_available());
}
