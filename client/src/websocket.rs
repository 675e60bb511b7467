use futures_util::{SinkExt, StreamExt, stream::SplitStream};
use hintsweeper_common::{
    models::Pos,
    params::ParamsRequest,
    protocol::{ClientMessage, ServerMessage},
};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::Result;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsReader = SplitStream<WsStream>;

/// What a single frame from the room amounts to.
#[derive(Debug)]
enum Incoming {
    Server(ServerMessage),
    Closed,
    /// Control frames, binary frames and text the protocol doesn't know.
    Skipped,
}

fn decode(frame: Message) -> Incoming {
    match frame {
        Message::Text(text) => match serde_json::from_str(&text) {
            Ok(message) => Incoming::Server(message),
            Err(e) => {
                warn!("Skipping unreadable server message {}: {}", text.as_str(), e);
                Incoming::Skipped
            }
        },
        Message::Close(_) => Incoming::Closed,
        _ => Incoming::Skipped,
    }
}

fn encode(message: &ClientMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            warn!("Failed to serialize {:?}: {}", message, e);
            None
        }
    }
}

/// Room id from a `.../ws?id=...` URL.
fn room_id(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
}

/// A live connection to one game room. Actions are queued on a channel and
/// written by a background task, so senders can be handed out freely.
pub struct HintsweeperWebSocket {
    room: Option<String>,
    sender: mpsc::UnboundedSender<ClientMessage>,
    reader: WsReader,
    writer_task: JoinHandle<()>,
}

impl HintsweeperWebSocket {
    /// Open the room's socket. The server answers with an `init` message,
    /// read it with [`wait_for_init`](Self::wait_for_init) or
    /// [`receive_message`](Self::receive_message).
    pub async fn connect(url: &str) -> Result<Self> {
        let room = room_id(url);
        info!("Joining room {:?} at {}", room, url);

        let (ws_stream, _) = connect_async(url).await?;
        let (mut writer, reader) = ws_stream.split();
        let (sender, mut receiver) = mpsc::unbounded_channel::<ClientMessage>();

        let writer_task = tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                let Some(frame) = encode(&message) else {
                    continue;
                };
                debug!("Sending {:?}", message);
                if let Err(e) = writer.send(frame).await {
                    warn!("Failed to send {:?}: {}", message, e);
                    break;
                }
            }
            let _ = writer.close().await;
        });

        Ok(Self {
            room,
            sender,
            reader,
            writer_task,
        })
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn get_sender(&self) -> mpsc::UnboundedSender<ClientMessage> {
        self.sender.clone()
    }

    pub async fn send_message(&self, message: ClientMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| "Room connection closed")?;
        Ok(())
    }

    pub async fn reveal(&self, pos: Pos) -> Result<()> {
        self.send_message(ClientMessage::Reveal { pos }).await
    }

    pub async fn flag(&self, pos: Pos) -> Result<()> {
        self.send_message(ClientMessage::Flag { pos }).await
    }

    pub async fn chord(&self, pos: Pos) -> Result<()> {
        self.send_message(ClientMessage::Chord { pos }).await
    }

    pub async fn hint(&self, big: bool) -> Result<()> {
        self.send_message(ClientMessage::Hint { big }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send_message(ClientMessage::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send_message(ClientMessage::Resume).await
    }

    pub async fn restart(&self, params: impl Into<ParamsRequest>) -> Result<()> {
        self.send_message(ClientMessage::Restart {
            params: params.into(),
        })
        .await
    }

    /// Next server message, or `None` once the room closes the connection.
    pub async fn receive_message(&mut self) -> Result<Option<ServerMessage>> {
        while let Some(frame) = self.reader.next().await {
            match decode(frame?) {
                Incoming::Server(message) => return Ok(Some(message)),
                Incoming::Closed => {
                    info!("Room {:?} closed the connection", self.room);
                    return Ok(None);
                }
                Incoming::Skipped => {}
            }
        }
        Ok(None)
    }

    /// Read until the room sends a full board. Ticks and updates that arrive
    /// first are dropped.
    pub async fn wait_for_init(&mut self) -> Result<Option<ServerMessage>> {
        while let Some(message) = self.receive_message().await? {
            if matches!(message, ServerMessage::Init { .. }) {
                return Ok(Some(message));
            }
            debug!("Dropping {:?} while waiting for the board", message);
        }
        Ok(None)
    }

    /// Flush queued actions and close.
    pub async fn close(self) -> Result<()> {
        drop(self.sender);
        let _ = self.writer_task.await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hintsweeper_common::models::{ClockState, TimerView};

    #[test]
    fn text_frames_become_server_messages() {
        let frame = Message::Text(r#"{"type":"error","message":"nope"}"#.into());
        match decode(frame) {
            Incoming::Server(ServerMessage::Error { message }) => assert_eq!(message, "nope"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tick_frame_carries_the_timer() {
        let timer = TimerView {
            timed: true,
            state: ClockState::Running,
            seconds: 42,
            band: None,
        };
        let json = serde_json::to_string(&ServerMessage::Tick { timer }).unwrap();
        match decode(Message::Text(json.into())) {
            Incoming::Server(ServerMessage::Tick { timer: decoded }) => assert_eq!(decoded, timer),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_text_and_control_frames_are_skipped() {
        assert!(matches!(
            decode(Message::Text(r#"{"type":"confetti"}"#.into())),
            Incoming::Skipped
        ));
        assert!(matches!(
            decode(Message::Ping(Default::default())),
            Incoming::Skipped
        ));
        assert!(matches!(decode(Message::Close(None)), Incoming::Closed));
    }

    #[test]
    fn actions_are_sent_as_tagged_json() {
        let frame = encode(&ClientMessage::Flag {
            pos: Pos { x: 3, y: 1 },
        });
        let Some(Message::Text(text)) = frame else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["action"], "flag");
    }

    #[test]
    fn room_id_comes_from_the_query() {
        assert_eq!(
            room_id("ws://localhost:8000/ws?id=abc12").as_deref(),
            Some("abc12")
        );
        assert_eq!(room_id("ws://localhost:8000/ws"), None);
        assert_eq!(room_id("not a url"), None);
    }
}
