//! Hintsweeper client library
//!
//! Talks to a hintsweeper server over HTTP (room creation, scoreboards) and
//! WebSocket (live play).
//!
//! ## High-level interface
//!
//! [`HintsweeperGame`] creates or joins a room and keeps a [`GameState`]
//! mirror current in the background:
//!
//! ```rust,no_run
//! use hintsweeper_client::{GameParams, HintsweeperGame, Pos};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let game = HintsweeperGame::new("http://localhost:8000")?;
//!     game.start_game(GameParams::default().timed(true)).await?;
//!
//!     game.reveal(Pos { x: 0, y: 0 }).await?;
//!     game.flag(Pos { x: 1, y: 1 }).await?;
//!     game.hint(false).await?;
//!
//!     if let Some(state) = game.get_state().await {
//!         println!("{} mines left", state.hud.mines_display());
//!     }
//!
//!     game.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Low-level interface
//!
//! [`HintsweeperClient`] and [`HintsweeperWebSocket`] expose the raw
//! protocol:
//!
//! ```rust,no_run
//! use hintsweeper_client::{ClientMessage, HintsweeperClient, HintsweeperWebSocket, ParamsRequest, Pos};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let client = HintsweeperClient::new("http://localhost:8000")?;
//!     let created = client.create_game(ParamsRequest::default()).await?;
//!
//!     let mut ws = HintsweeperWebSocket::connect(&client.websocket_url(&created.id)?).await?;
//!     if let Some(message) = ws.receive_message().await? {
//!         println!("Received: {:?}", message);
//!     }
//!
//!     ws.send_message(ClientMessage::Reveal { pos: Pos { x: 0, y: 0 } }).await?;
//!     ws.close().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod game;
mod websocket;

pub use client::HintsweeperClient;
pub use game::{GameEvent, GameState, HintsweeperGame, receive};
pub use websocket::HintsweeperWebSocket;

pub use hintsweeper_common::{
    format::format_duration,
    models::*,
    params::{GameParams, ParamInput, ParamsRequest},
    protocol::*,
    results::*,
};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
