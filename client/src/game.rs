use std::collections::HashMap;
use std::sync::Arc;

use hintsweeper_common::{
    models::{Cell, GameStatus, Hud, Pos, TimerView},
    params::{GameParams, ParamsRequest},
    protocol::{ClientMessage, ServerMessage},
    results::{ResultRecord, ScoreboardView},
};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{HintsweeperClient, HintsweeperWebSocket, Result};

/// What changed in the local mirror after a server message.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A new session started, either on join or after a restart.
    Initialized { params: GameParams },
    BoardUpdated { changed_positions: Vec<Pos> },
    HudUpdated { hud: Hud },
    TimerTicked { timer: TimerView },
    StatusChanged { status: GameStatus },
    /// The session ended and the result was recorded.
    Finished {
        result: ResultRecord,
        scoreboard: ScoreboardView,
    },
    /// The server refused the last action.
    ServerError { message: String },
    ConnectionLost,
}

/// Local copy of a game room as the server last described it.
#[derive(Debug, Clone)]
pub struct GameState {
    pub params: GameParams,
    pub board: Vec<Vec<Cell>>,
    pub status: GameStatus,
    pub hud: Hud,
    pub last_result: Option<ResultRecord>,
    pub scoreboard: ScoreboardView,
}

impl GameState {
    pub fn new(params: GameParams, board: Vec<Vec<Cell>>, status: GameStatus, hud: Hud) -> Self {
        Self {
            params,
            board,
            status,
            hud,
            last_result: None,
            scoreboard: ScoreboardView::default(),
        }
    }

    pub fn get_cell(&self, pos: Pos) -> Option<&Cell> {
        self.board.get(pos.y)?.get(pos.x)
    }

    pub fn set_cell(&mut self, pos: Pos, cell: Cell) {
        if let Some(row) = self.board.get_mut(pos.y)
            && let Some(cell_ref) = row.get_mut(pos.x)
        {
            *cell_ref = cell;
        }
    }

    /// Cells per display character, handy for quick summaries.
    pub fn count_cells(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for cell in self.board.iter().flatten() {
            *counts.entry(cell.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn is_won(&self) -> bool {
        self.status == GameStatus::Won
    }

    /// Fold one server message into the mirror.
    pub fn apply(&mut self, message: ServerMessage) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match message {
            ServerMessage::Init {
                params,
                field,
                status,
                hud,
            } => {
                let scoreboard = std::mem::take(&mut self.scoreboard);
                let last_result = self.last_result.take();
                *self = GameState {
                    last_result,
                    scoreboard,
                    ..GameState::new(params, field, status, hud)
                };
                events.push(GameEvent::Initialized { params });
            }
            ServerMessage::Update {
                updates,
                status,
                hud,
            } => {
                let changed_positions: Vec<Pos> = updates.iter().map(|u| u.pos).collect();
                for update in updates {
                    self.set_cell(update.pos, update.value);
                }
                if !changed_positions.is_empty() {
                    events.push(GameEvent::BoardUpdated { changed_positions });
                }
                if hud != self.hud {
                    self.hud = hud;
                    events.push(GameEvent::HudUpdated { hud });
                }
                if status != self.status {
                    self.status = status;
                    events.push(GameEvent::StatusChanged { status });
                }
            }
            ServerMessage::Tick { timer } => {
                self.hud.timer = timer;
                events.push(GameEvent::TimerTicked { timer });
            }
            ServerMessage::Finished { result, scoreboard } => {
                self.last_result = Some(result.clone());
                self.scoreboard = scoreboard.clone();
                events.push(GameEvent::Finished { result, scoreboard });
            }
            ServerMessage::Error { message } => {
                events.push(GameEvent::ServerError { message });
            }
        }
        events
    }
}

/// Apply a message to a mirror that may not exist yet. Only an `init`
/// message can create one.
pub fn receive(state: &mut Option<GameState>, message: ServerMessage) -> Vec<GameEvent> {
    if let Some(game_state) = state.as_mut() {
        return game_state.apply(message);
    }

    match message {
        ServerMessage::Init {
            params,
            field,
            status,
            hud,
        } => {
            *state = Some(GameState::new(params, field, status, hud));
            vec![GameEvent::Initialized { params }]
        }
        ServerMessage::Error { message } => vec![GameEvent::ServerError { message }],
        message => {
            warn!("Dropping message before init: {:?}", message);
            Vec::new()
        }
    }
}

struct ConnectionState {
    websocket_sender: mpsc::UnboundedSender<ClientMessage>,
    game_id: String,
    background_task: JoinHandle<()>,
}

impl ConnectionState {
    fn send_message(&self, message: ClientMessage) -> Result<()> {
        self.websocket_sender
            .send(message)
            .map_err(|_| "WebSocket sender closed")?;
        Ok(())
    }

    async fn abort_and_wait_background_task(self) {
        self.background_task.abort();
        let _ = self.background_task.await;
    }
}

type EventSender = Arc<RwLock<Option<mpsc::UnboundedSender<GameEvent>>>>;

/// High-level client: creates or joins a room and keeps a [`GameState`]
/// mirror up to date in the background.
pub struct HintsweeperGame {
    client: HintsweeperClient,
    connection_state: Arc<RwLock<Option<ConnectionState>>>,
    event_sender: EventSender,
    state: Arc<RwLock<Option<GameState>>>,
}

impl HintsweeperGame {
    pub fn new(server_url: &str) -> Result<Self> {
        let client = HintsweeperClient::new(server_url)?;
        Ok(Self {
            client,
            connection_state: Arc::new(RwLock::new(None)),
            event_sender: Arc::new(RwLock::new(None)),
            state: Arc::new(RwLock::new(None)),
        })
    }

    pub fn client(&self) -> &HintsweeperClient {
        &self.client
    }

    /// Replaces any earlier subscription.
    pub async fn subscribe_to_events(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.event_sender.write().await = Some(sender);
        receiver
    }

    pub async fn start_game(&self, params: impl Into<ParamsRequest>) -> Result<GameParams> {
        let created = self.client.create_game(params).await?;
        info!(
            "Created game {}: {}x{} with {} mines",
            created.id, created.params.width, created.params.height, created.params.mines
        );

        self.join_game(created.id).await?;
        Ok(created.params)
    }

    pub async fn join_game(&self, game_id: String) -> Result<()> {
        info!("Joining game with ID: {}", game_id);

        let mut conn_state = self.connection_state.write().await;
        if let Some(existing_conn) = conn_state.take() {
            existing_conn.abort_and_wait_background_task().await;
        }
        self.state.write().await.take();

        let ws_url = self.client.websocket_url(&game_id)?;
        let websocket = HintsweeperWebSocket::connect(&ws_url).await?;
        let websocket_sender = websocket.get_sender();
        let background_task = self.start_background_listener(websocket);

        *conn_state = Some(ConnectionState {
            websocket_sender,
            game_id,
            background_task,
        });
        Ok(())
    }

    async fn send_client_message(&self, message: ClientMessage) -> Result<()> {
        match &*self.connection_state.read().await {
            Some(conn) => conn.send_message(message),
            None => Err("Not connected to a game. Call start_game() first.".into()),
        }
    }

    pub async fn reveal(&self, pos: Pos) -> Result<()> {
        debug!("Revealing cell at {}", pos);
        self.send_client_message(ClientMessage::Reveal { pos }).await
    }

    pub async fn flag(&self, pos: Pos) -> Result<()> {
        debug!("Toggling flag at {}", pos);
        self.send_client_message(ClientMessage::Flag { pos }).await
    }

    pub async fn chord(&self, pos: Pos) -> Result<()> {
        debug!("Chording at {}", pos);
        self.send_client_message(ClientMessage::Chord { pos }).await
    }

    pub async fn hint(&self, big: bool) -> Result<()> {
        self.send_client_message(ClientMessage::Hint { big }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send_client_message(ClientMessage::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send_client_message(ClientMessage::Resume).await
    }

    pub async fn restart(&self, params: impl Into<ParamsRequest>) -> Result<()> {
        let params = params.into();
        info!("Restarting game with {:?}", params);
        self.send_client_message(ClientMessage::Restart { params })
            .await
    }

    pub async fn get_state(&self) -> Option<GameState> {
        self.state.read().await.clone()
    }

    pub async fn get_game_id(&self) -> Option<String> {
        self.connection_state
            .read()
            .await
            .as_ref()
            .map(|conn| conn.game_id.clone())
    }

    pub async fn is_connected(&self) -> bool {
        self.connection_state.read().await.is_some()
    }

    pub async fn disconnect(&self) -> Result<()> {
        if let Some(conn) = self.connection_state.write().await.take() {
            conn.abort_and_wait_background_task().await;
        }
        *self.event_sender.write().await = None;
        *self.state.write().await = None;

        info!("Disconnected from game");
        Ok(())
    }

    fn start_background_listener(&self, mut websocket: HintsweeperWebSocket) -> JoinHandle<()> {
        let state = self.state.clone();
        let event_sender = self.event_sender.clone();

        tokio::spawn(async move {
            loop {
                let message = match websocket.receive_message().await {
                    Ok(Some(message)) => message,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Error receiving WebSocket message: {}", e);
                        break;
                    }
                };

                let events = receive(&mut *state.write().await, message);
                if let Some(sender) = &*event_sender.read().await {
                    for event in events {
                        let _ = sender.send(event);
                    }
                }
            }

            if let Some(sender) = &*event_sender.read().await {
                let _ = sender.send(GameEvent::ConnectionLost);
            }
        })
    }
}
