//! Hintsweeper game server: the Minesweeper engine plus the HTTP/WebSocket
//! surface that plays it.

pub mod cleanup;
pub mod config;
pub mod cors;
pub mod data;
pub mod error;
pub mod logic;
pub mod routes;
pub mod scoreboard;
pub mod ticker;

use std::sync::Arc;

use dashmap::DashMap;
use rocket::{Build, Rocket, routes};

use crate::{
    config::GameSettings,
    cors::create_cors,
    logic::Games,
    routes::{create_game, get_scoreboard, websocket_handler},
};

/// The rocket instance without background tasks.
pub fn build(settings: GameSettings) -> Rocket<Build> {
    let games: Games = Arc::new(DashMap::new());

    rocket::build()
        .attach(create_cors())
        .manage(games)
        .manage(settings)
        .mount("/", routes![create_game, get_scoreboard, websocket_handler])
}
