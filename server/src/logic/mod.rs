pub mod board;
pub mod clock;
pub mod session;

use std::{collections::HashMap, sync::Arc, time::Instant};

use dashmap::DashMap;
use rand::{SeedableRng, rngs::StdRng};
use rocket::futures::{SinkExt, future::join_all, stream::SplitSink};
use rocket_ws::{Message, stream::DuplexStream};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use hintsweeper_common::{
    models::Pos,
    params::GameParams,
    protocol::{CellUpdate, ServerMessage},
    results::ResultRecord,
};

use crate::{config::GameSettings, error::EngineError, scoreboard::Scoreboard};

pub use session::{FinishedGame, Outcome, Session};

pub type SharedGame = Arc<Mutex<Game>>;
pub type Games = Arc<DashMap<String, SharedGame>>;

type Stream = SplitSink<DuplexStream, Message>;

/// A game room: the current session, its scoreboard and everyone watching.
pub struct Game {
    session: Session,
    scoreboard: Scoreboard,
    settings: GameSettings,
    rng: StdRng,
    streams: HashMap<Uuid, Stream>,
    pub(crate) ticker: Option<JoinHandle<()>>,
    created_at: Instant,
    last_activity: Instant,
}

async fn send(stream: &mut Stream, message: &ServerMessage) {
    if let Ok(text) = serde_json::to_string(message) {
        let _ = stream.send(Message::Text(text)).await;
    }
}

async fn broadcast(streams: &mut HashMap<Uuid, Stream>, message: &ServerMessage) {
    let futures: Vec<_> = streams
        .values_mut()
        .map(|stream| send(stream, message))
        .collect();

    join_all(futures).await;
}

impl Game {
    #[instrument(level = "trace")]
    pub fn new(params: GameParams, settings: GameSettings) -> Self {
        Self::with_rng(params, settings, StdRng::from_os_rng())
    }

    pub fn with_rng(params: GameParams, settings: GameSettings, mut rng: StdRng) -> Self {
        let session = Session::new(params, settings.countdown_seconds, &mut rng);
        let now = Instant::now();
        Self {
            session,
            scoreboard: Scoreboard::new(),
            settings,
            rng,
            streams: HashMap::new(),
            ticker: None,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    fn init_message(&self) -> ServerMessage {
        ServerMessage::Init {
            params: self.session.params(),
            field: self.session.field_view(),
            status: self.session.status(),
            hud: self.session.hud(),
        }
    }

    /// Start over with new parameters. Results recorded so far are kept.
    #[instrument(level = "trace", skip(self))]
    pub async fn restart(&mut self, params: GameParams) {
        info!(
            "Restarting game with {}x{} and {} mines",
            params.width, params.height, params.mines
        );
        self.session = Session::new(params, self.settings.countdown_seconds, &mut self.rng);
        self.last_activity = Instant::now();
        let message = self.init_message();
        broadcast(&mut self.streams, &message).await;
    }

    #[instrument(level = "trace", skip(self, stream))]
    pub async fn add_stream(&mut self, mut stream: Stream) -> Uuid {
        let id = Uuid::new_v4();
        send(&mut stream, &self.init_message()).await;
        self.streams.insert(id, stream);
        self.last_activity = Instant::now();
        info!(
            "Stream {} added, total connections: {}",
            id,
            self.streams.len()
        );
        id
    }

    /// Drop a connection. When the last one goes the session is paused so
    /// nobody loses time to an empty room.
    #[instrument(level = "trace", skip(self))]
    pub async fn remove_stream(&mut self, id: &Uuid) {
        if self.streams.remove(id).is_some() {
            info!(
                "Stream {} removed, remaining connections: {}",
                id,
                self.streams.len()
            );
        } else {
            warn!("Attempted to remove non-existent stream: {}", id);
        }
        self.last_activity = Instant::now();

        if self.streams.is_empty() && !self.session.pause().is_noop() {
            info!("Last connection gone, session paused");
        }
    }

    pub fn has_active_connections(&self) -> bool {
        !self.streams.is_empty()
    }

    pub fn should_cleanup(&self, inactive_timeout_secs: u64, active_timeout_secs: u64) -> bool {
        if self.created_at.elapsed().as_secs() > active_timeout_secs {
            return true;
        }
        if self.has_active_connections() {
            return false;
        }
        self.last_activity.elapsed().as_secs() > inactive_timeout_secs
    }

    pub fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub async fn reveal(&mut self, pos: Pos) -> Result<(), EngineError> {
        self.last_activity = Instant::now();
        let outcome = self.session.reveal(pos)?;
        self.publish(outcome).await;
        Ok(())
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub async fn flag(&mut self, pos: Pos) -> Result<(), EngineError> {
        self.last_activity = Instant::now();
        let outcome = self.session.toggle_flag(pos)?;
        self.publish(outcome).await;
        Ok(())
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub async fn chord(&mut self, pos: Pos) -> Result<(), EngineError> {
        self.last_activity = Instant::now();
        let outcome = self.session.chord(pos)?;
        self.publish(outcome).await;
        Ok(())
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn hint(&mut self, big: bool) {
        self.last_activity = Instant::now();
        let outcome = self.session.hint(big, &mut self.rng);
        self.publish(outcome).await;
    }

    pub async fn pause(&mut self) {
        self.last_activity = Instant::now();
        let outcome = self.session.pause();
        self.publish(outcome).await;
    }

    pub async fn resume(&mut self) {
        self.last_activity = Instant::now();
        let outcome = self.session.resume();
        self.publish(outcome).await;
    }

    /// One second of game time. Plain ticks only carry the timer.
    pub async fn tick(&mut self) {
        let outcome = self.session.tick();
        if outcome.finished {
            self.publish(outcome).await;
        } else if outcome.hud_changed {
            let message = ServerMessage::Tick {
                timer: self.session.timer_view(),
            };
            broadcast(&mut self.streams, &message).await;
        }
    }

    pub async fn send_error(&mut self, id: &Uuid, message: String) {
        if let Some(stream) = self.streams.get_mut(id) {
            send(stream, &ServerMessage::Error { message }).await;
        }
    }

    /// Broadcast what changed and, if the game just ended, its result.
    async fn publish(&mut self, outcome: Outcome) -> Option<ResultRecord> {
        if outcome.is_noop() {
            return None;
        }

        let updates = outcome
            .changed
            .iter()
            .filter_map(|pos| {
                self.session
                    .cell_view(*pos)
                    .map(|value| CellUpdate { pos: *pos, value })
            })
            .collect();
        let message = ServerMessage::Update {
            updates,
            status: self.session.status(),
            hud: self.session.hud(),
        };
        broadcast(&mut self.streams, &message).await;

        if !outcome.finished {
            return None;
        }
        let finished = self.session.finished_game()?;
        let result = self.scoreboard.record(finished);
        let message = ServerMessage::Finished {
            result: result.clone(),
            scoreboard: self.scoreboard.view(),
        };
        broadcast(&mut self.streams, &message).await;
        debug!("Published result to {} connections", self.streams.len());
        Some(result)
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hintsweeper_common::models::{ClockState, GameStatus};

    fn game(params: GameParams) -> Game {
        Game::with_rng(params, GameSettings::default(), StdRng::seed_from_u64(17))
    }

    /// Reveal safe cells in order until the session ends.
    async fn play_out(game: &mut Game) {
        let positions: Vec<Pos> = (0..game.session.params().height)
            .flat_map(|y| (0..game.session.params().width).map(move |x| Pos { x, y }))
            .collect();
        for pos in positions {
            if game.session.status().is_over() {
                break;
            }
            game.reveal(pos).await.unwrap();
        }
    }

    #[tokio::test]
    async fn finished_session_lands_on_the_scoreboard() {
        let mut game = game(GameParams::default());
        play_out(&mut game).await;

        assert!(game.session.status().is_over());
        assert_eq!(game.scoreboard.results().len(), 1);
        let record = &game.scoreboard.results()[0];
        assert_eq!(record.win, game.session.status() == GameStatus::Won);
        assert_eq!(record.mines_total, 20);
    }

    #[tokio::test]
    async fn restart_keeps_results() {
        let mut game = game(GameParams::smallest());
        play_out(&mut game).await;
        game.restart(GameParams::default()).await;

        assert_eq!(game.session.status(), GameStatus::InProgress);
        assert_eq!(game.session.params(), GameParams::default());
        assert_eq!(game.scoreboard.results().len(), 1);
    }

    #[tokio::test]
    async fn out_of_bounds_reveal_is_reported() {
        let mut game = game(GameParams::smallest());
        assert!(game.reveal(Pos { x: 5, y: 0 }).await.is_err());
        assert!(game.flag(Pos { x: 0, y: 7 }).await.is_err());
        assert_eq!(game.session.revealed(), 0);
    }

    #[tokio::test]
    async fn pause_and_resume_go_through_the_clock() {
        let mut game = game(GameParams::default().timed(true));
        game.pause().await;
        assert_eq!(game.session.clock().state(), ClockState::Paused);
        game.tick().await;
        assert_eq!(game.session.clock().remaining(), Some(60));
        game.resume().await;
        game.tick().await;
        assert_eq!(game.session.clock().remaining(), Some(59));
    }

    #[test]
    fn cleanup_after_timeouts() {
        let game = game(GameParams::default());
        assert!(!game.should_cleanup(600, 86400));
        assert!(!game.has_active_connections());
        // Zero-second limits still need a full second to pass.
        assert!(!game.should_cleanup(0, 86400));
    }
}
