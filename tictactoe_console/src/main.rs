#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod client_main;
mod network;
mod tui;

use std::io;

use clap::{Command, arg};

fn main() -> io::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let matches = Command::new("Tictactoe")
        .version(clap::crate_version!())
        .about("Tic-tac-toe online match client")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Create a new room and wait for an opponent")
                .arg(arg!(<server_address> "Server address"))
                .arg(arg!(<player_name> "Player name"))
                .arg(arg!(--password <password> "Room password").required(false).default_value("")),
        )
        .subcommand(
            Command::new("join")
                .about("Join an existing room")
                .arg(arg!(<server_address> "Server address"))
                .arg(arg!(<room_id> "Room id"))
                .arg(arg!(<player_name> "Player name"))
                .arg(arg!(--password <password> "Room password").required(false).default_value("")),
        )
        .subcommand(
            Command::new("rooms")
                .about("List rooms that are open for joining")
                .arg(arg!(<server_address> "Server address")),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("create", sub_matches)) => client_main::run(client_main::ClientConfig {
            server_address: sub_matches.get_one::<String>("server_address").unwrap().clone(),
            action: client_main::ClientAction::Create {
                player_name: sub_matches.get_one::<String>("player_name").unwrap().clone(),
                password: sub_matches.get_one::<String>("password").unwrap().clone(),
            },
        }),
        Some(("join", sub_matches)) => client_main::run(client_main::ClientConfig {
            server_address: sub_matches.get_one::<String>("server_address").unwrap().clone(),
            action: client_main::ClientAction::Join {
                room_id: sub_matches.get_one::<String>("room_id").unwrap().clone(),
                player_name: sub_matches.get_one::<String>("player_name").unwrap().clone(),
                password: sub_matches.get_one::<String>("password").unwrap().clone(),
            },
        }),
        Some(("rooms", sub_matches)) => {
            client_main::list_rooms(sub_matches.get_one::<String>("server_address").unwrap().clone())
        }
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}
