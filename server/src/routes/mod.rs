use std::sync::Arc;

use dashmap::Entry;
use nanoid::nanoid;
use rocket::{State, futures::StreamExt, get, http::Status, post, serde::json::Json};
use rocket_ws::{Channel, Message, WebSocket};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use hintsweeper_common::{
    models::CreateResponse, params::ParamsRequest, protocol::ClientMessage,
    results::ScoreboardView,
};

use crate::{
    config::GameSettings,
    logic::{Game, Games, SharedGame},
    ticker::sync_ticker,
};

#[instrument(level = "trace", skip(games, game))]
fn add_game(games: &State<Games>, game: Game) -> String {
    let mut id_length = 5;
    let max_attempts_per_length = 10;
    let game = Arc::new(Mutex::new(game));

    loop {
        for _ in 0..max_attempts_per_length {
            let id = nanoid!(id_length);
            match games.entry(id.clone()) {
                Entry::Occupied(_) => {
                    debug!("Game ID collision, trying another: {}", id);
                    continue;
                }
                Entry::Vacant(entry) => {
                    entry.insert(game);
                    info!("Created new game with ID: {}", id);
                    return id;
                }
            }
        }

        warn!(
            "Exhausted ID attempts at length {}, increasing to {}",
            id_length,
            id_length + 1
        );
        id_length += 1;
    }
}

/// Create a room. Every parameter is optional and gets clamped.
#[post("/create", data = "<params>")]
#[instrument(level = "trace", skip(games, settings, params))]
pub fn create_game(
    params: Json<ParamsRequest>,
    games: &State<Games>,
    settings: &State<GameSettings>,
) -> Json<CreateResponse> {
    let params = params.resolve();
    info!(
        "Game creation request: {}x{} with {} mines{}",
        params.width,
        params.height,
        params.mines,
        if params.timed { ", timed" } else { "" }
    );

    let game = Game::new(params, *settings.inner());
    let id = add_game(games, game);
    Json(CreateResponse { id, params })
}

#[get("/scoreboard?<id>")]
#[instrument(level = "trace", skip(games))]
pub async fn get_scoreboard(
    games: &State<Games>,
    id: String,
) -> Result<Json<ScoreboardView>, Status> {
    let Some(game) = games.get(&id).map(|entry| entry.value().clone()) else {
        warn!("Scoreboard requested for non-existent game: {}", id);
        return Err(Status::NotFound);
    };
    let game = game.lock().await;
    Ok(Json(game.scoreboard().view()))
}

#[get("/ws?<id>")]
#[instrument(level = "trace", skip(ws, games), fields(game_id = %id))]
pub fn websocket_handler(
    ws: WebSocket,
    games: &State<Games>,
    id: String,
) -> Result<Channel<'static>, Status> {
    let game = match games.get(&id) {
        None => {
            warn!("WebSocket connection attempt for non-existent game: {}", id);
            return Err(Status::NotFound);
        }
        Some(value) => value.value().clone(),
    };

    Ok(ws.channel(move |stream| {
        let game_id = id.clone();
        Box::pin(async move {
            let (write, mut read) = stream.split();

            let stream_id = {
                let mut guard = game.lock().await;
                let stream_id = guard.add_stream(write).await;
                sync_ticker(&game, &mut guard);
                stream_id
            };
            info!("Client connected to game {} (stream: {})", game_id, stream_id);

            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        handle_text(&game, &game_id, &stream_id, &text).await;
                    }
                    Ok(Message::Close(_)) => {
                        info!(
                            "WebSocket connection closed for game {} (stream: {})",
                            game_id, stream_id
                        );
                        break;
                    }
                    Ok(Message::Ping(_) | Message::Pong(_)) => {}
                    Err(e) => {
                        error!(
                            "WebSocket error in game {} (stream: {}): {}",
                            game_id, stream_id, e
                        );
                        break;
                    }
                    Ok(_) => {
                        debug!("Received non-text message in game {}, closing", game_id);
                        break;
                    }
                }
            }

            {
                let mut guard = game.lock().await;
                guard.remove_stream(&stream_id).await;
                sync_ticker(&game, &mut guard);
            }
            info!(
                "Client disconnected from game {} (stream: {})",
                game_id, stream_id
            );
            Ok(())
        })
    }))
}

/// Apply one client frame. Bad frames and bad positions are answered with
/// an error to the sender only.
async fn handle_text(game: &SharedGame, game_id: &str, stream_id: &Uuid, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(
                "Invalid message format in game {}: {} - Error: {}",
                game_id, text, e
            );
            let mut guard = game.lock().await;
            guard
                .send_error(stream_id, format!("invalid message: {}", e))
                .await;
            return;
        }
    };
    debug!("Received message from game {}: {:?}", game_id, message);

    let mut guard = game.lock().await;
    let result = match message {
        ClientMessage::Reveal { pos } => guard.reveal(pos).await,
        ClientMessage::Flag { pos } => guard.flag(pos).await,
        ClientMessage::Chord { pos } => guard.chord(pos).await,
        ClientMessage::Hint { big } => {
            guard.hint(big).await;
            Ok(())
        }
        ClientMessage::Pause => {
            guard.pause().await;
            Ok(())
        }
        ClientMessage::Resume => {
            guard.resume().await;
            Ok(())
        }
        ClientMessage::Restart { params } => {
            guard.restart(params.resolve()).await;
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!("Rejected action in game {}: {}", game_id, e);
        guard.send_error(stream_id, e.to_string()).await;
    }
    sync_ticker(game, &mut guard);
}
