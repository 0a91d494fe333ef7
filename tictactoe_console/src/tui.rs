use std::fmt;
use std::io;

use console::Style;
use crossterm::style::Print;
use crossterm::{cursor, execute, terminal};
use itertools::Itertools;

use tictactoe::board::{Board, Cell, GamePhase, Symbol};
use tictactoe::client::ClientSession;


// Note. Not using `lines()` because it removes trailing new line.
fn writeln_raw(stdout: &mut io::Stdout, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    for line in s.split('\n') {
        execute!(stdout, Print(line), cursor::MoveToNextLine(1), cursor::Hide)?;
    }
    Ok(())
}

fn symbol_style(symbol: Symbol) -> Style {
    match symbol {
        Symbol::X => Style::new().red().bold(),
        Symbol::O => Style::new().blue().bold(),
    }
}

fn render_cell(board: &Board, cell: Cell) -> String {
    match board.cell(cell) {
        Some(symbol) => symbol_style(symbol).apply_to(symbol).to_string(),
        // Free cells show the key that claims them.
        None => Style::new().black().bright().apply_to(cell.index() + 1).to_string(),
    }
}

fn render_board(board: &Board) -> String {
    let cells = Cell::all().map(|cell| render_cell(board, cell)).collect_vec();
    cells
        .chunks(3)
        .map(|row| format!(" {} ", row.iter().join(" │ ")))
        .join("\n───┼───┼───\n")
}

fn render_players(session: &ClientSession) -> String {
    session
        .players()
        .iter()
        .map(|name| {
            let symbol = session.symbols().get(name).copied();
            let mark = match symbol {
                Some(symbol) => symbol_style(symbol).apply_to(symbol).to_string(),
                None => "?".to_owned(),
            };
            let mut line = format!("{} ({})", name, mark);
            if session.player_name() == Some(name.as_str()) {
                line = Style::new().bold().apply_to(line).to_string();
            }
            let has_turn = symbol.is_some() && symbol == session.current_turn();
            if has_turn { format!("▸ {}", line) } else { format!("  {}", line) }
        })
        .join("\n")
}

fn render_banner(session: &ClientSession) -> String {
    match session.game_phase() {
        Some(GamePhase::Playing) => match session.current_turn() {
            Some(turn) if session.is_my_turn() => {
                Style::new().green().bold().apply_to(format!("Your turn ({})", turn)).to_string()
            }
            Some(turn) => {
                Style::new().dim().apply_to(format!("Opponent's turn ({})", turn)).to_string()
            }
            None => "Game in progress".to_owned(),
        },
        Some(GamePhase::Finished) => {
            let message = match session.winner() {
                Some(winner) if session.player_name() == Some(winner) => "You won!".to_owned(),
                Some(winner) => format!("{} won.", winner),
                None => "Game over.".to_owned(),
            };
            Style::new().magenta().bold().apply_to(message).to_string()
        }
        Some(GamePhase::Draw) => Style::new().yellow().bold().apply_to("Draw!").to_string(),
        // `None` means the room was just created and no snapshot arrived yet.
        Some(GamePhase::Waiting) | None => {
            let message = if session.waiting_for_opponent() || session.players().is_empty() {
                "Waiting for another player to join..."
            } else {
                "Waiting..."
            };
            Style::new().cyan().apply_to(message).to_string()
        }
    }
}

fn render_rematch_status(session: &ClientSession) -> Option<String> {
    if !session.rematch_available() {
        return None;
    }
    if session.rematch_acceptors().is_empty() {
        return Some("Press r to request a rematch.".to_owned());
    }
    let i_accepted = session
        .player_name()
        .is_some_and(|name| session.rematch_acceptors().contains(name));
    if i_accepted {
        Some("Rematch requested, waiting for the opponent...".to_owned())
    } else {
        let requestors = session.rematch_acceptors().iter().sorted().join(", ");
        Some(format!("{} wants a rematch. Press r to accept.", requestors))
    }
}

fn render_scoreboard(session: &ClientSession) -> Option<String> {
    if session.scoreboard().is_empty() {
        return None;
    }
    let scores = session
        .scoreboard()
        .iter()
        .sorted()
        .map(|(name, wins)| {
            let wins_str = if *wins == 1 { "win".to_owned() } else { "wins".to_owned() };
            format!("{}: {} {}", name, wins, wins_str)
        })
        .join("   ");
    Some(format!("{}   (games played: {})", scores, session.games_played()))
}

pub fn render(
    stdout: &mut io::Stdout, session: &ClientSession, status_message: &Option<String>,
) -> io::Result<()> {
    execute!(stdout, cursor::MoveTo(0, 0), terminal::Clear(terminal::ClearType::FromCursorDown))?;
    if let Some(room_id) = session.room_id() {
        writeln_raw(stdout, format!("Room {}", Style::new().bold().apply_to(room_id)))?;
        writeln_raw(stdout, "")?;
    }
    if !session.players().is_empty() {
        writeln_raw(stdout, render_players(session))?;
        writeln_raw(stdout, "")?;
    }
    writeln_raw(stdout, render_board(session.board()))?;
    writeln_raw(stdout, "")?;
    writeln_raw(stdout, render_banner(session))?;
    if let Some(line) = render_rematch_status(session) {
        writeln_raw(stdout, line)?;
    }
    if let Some(line) = render_scoreboard(session) {
        writeln_raw(stdout, line)?;
    }
    writeln_raw(stdout, "")?;
    writeln_raw(
        stdout,
        Style::new().dim().apply_to("[1-9] place a mark  [r] rematch  [s] resync  [q] quit"),
    )?;
    if let Some(message) = status_message {
        writeln_raw(stdout, Style::new().red().apply_to(message))?;
    }
    Ok(())
}
