use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt, TryStreamExt};
use hyper_tungstenite::tungstenite::{Error, Message as WsMessage};
use hyper_tungstenite::{HyperWebsocket, HyperWebsocketStream};
use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};

use crate::command;
use crate::config::PING_INTERVAL;
use crate::model::{Message, MessageType};
use crate::service::ChatRoom;

command! {
    OnMessageReceived(message: WsMessage);
    SendPing(instant: Instant) -> bool;
    pub Close();
    pub Send(body: String);
}

/// A room's handle to one connected socket.
pub struct ChatClient {
    pub id: usize,
    pub username: String,
    pub op: CommandSender,
}

impl ChatClient {
    pub async fn create(
        socket: HyperWebsocket,
        room: ChatRoom,
        username: String,
        id: usize,
    ) -> Result<ChatClient, Error> {
        let (sink, stream) = socket.await?.split();
        let (op, mut rx) = Command::new_channel();
        let socket_token = Self::listen_to_socket(&op, stream);
        let ping_token = Self::ping_repeatedly(&op);

        let mut state = Box::new(ClientInner {
            room,
            username: username.clone(),
            my_id: id,
            sink,
            last_pong: Instant::now(),
            ping_token,
            socket_token,
            is_detached: false,
            is_socket_closed: false,
        });
        // command listener
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::OnMessageReceived { message, resp_tx } => {
                        state.on_message_received(message).await;
                        let _ = resp_tx.send(());
                    }
                    Command::Send { body, resp_tx } => {
                        state.send(body).await;
                        let _ = resp_tx.send(());
                    }
                    Command::SendPing { instant, resp_tx } => {
                        let _ = resp_tx.send(state.send_ping(instant).await);
                    }
                    Command::Close { resp_tx } => {
                        state.close().await;
                        let _ = resp_tx.send(());
                    }
                }
            }
            debug!("client `{}` dropped", state.username);
        });

        Ok(ChatClient { id, username, op })
    }

    fn listen_to_socket(
        op: &CommandSender,
        mut stream: SplitStream<HyperWebsocketStream>,
    ) -> JoinHandle<()> {
        let op = op.clone();
        tokio::spawn(async move {
            while let Some(message) = stream.try_next().await.ok().flatten() {
                op.OnMessageReceived(message).await;
            }
            debug!("web socket's stream ended");
            op.Close().await;
        })
    }

    fn ping_repeatedly(op: &CommandSender) -> JoinHandle<()> {
        let op = op.clone();
        tokio::spawn(async move {
            let mut interval = interval(PING_INTERVAL);
            loop {
                let instant = interval.tick().await;
                if !op.SendPing(instant).await {
                    debug!("client closed, stop sending ping");
                    break;
                }
            }
        })
    }
}

struct ClientInner {
    room: ChatRoom,
    username: String,
    my_id: usize,
    sink: SplitSink<HyperWebsocketStream, WsMessage>,
    last_pong: Instant,
    ping_token: JoinHandle<()>,
    socket_token: JoinHandle<()>,
    is_detached: bool,
    is_socket_closed: bool,
}

impl ClientInner {
    async fn on_message_received(&mut self, message: WsMessage) {
        match message {
            WsMessage::Text(text) => {
                self.on_text(text).await;
            }
            WsMessage::Binary(msg) => {
                warn!("unexpected binary message: {:02X?}", msg);
            }
            WsMessage::Ping(_) => {}
            WsMessage::Pong(_) => {
                self.last_pong = Instant::now();
            }
            WsMessage::Close(msg) => {
                if let Some(msg) = &msg {
                    debug!(
                        "received close message with code {} and message: {}",
                        msg.code, msg.reason
                    );
                } else {
                    debug!("received close message");
                }
            }
            WsMessage::Frame(_) => {}
        }
    }

    async fn on_text(&mut self, text: String) {
        debug!("receive: {text}");
        match dispatch_text(&text, &self.username) {
            FrameAction::Forward { from, content } => {
                self.room.op.spawn().SendChat(from, content);
            }
            FrameAction::Leave => {
                self.detach();
                self.close().await;
            }
            FrameAction::Ignore => {}
        }
    }

    async fn send(&mut self, body: String) {
        if self.is_socket_closed || self.is_detached {
            return;
        }
        async fn send_and_flush(
            sink: &mut SplitSink<HyperWebsocketStream, WsMessage>,
            message: WsMessage,
        ) -> Result<(), Error> {
            sink.send(message).await?;
            sink.flush().await?;
            Ok(())
        }
        match send_and_flush(&mut self.sink, WsMessage::Text(body)).await {
            Ok(_) => {}
            Err(err) => {
                debug!("send ws failed: {err:?}");
                self.close().await;
            }
        }
    }

    async fn send_ping(&mut self, instant: Instant) -> bool {
        if self.is_socket_closed {
            return false;
        }
        let responded = instant.duration_since(self.last_pong) <= PING_INTERVAL * 2;
        if responded {
            if let Err(err) = self.sink.send(WsMessage::Ping(Vec::new())).await {
                debug!("send ping failed: {err:?}");
                self.close().await;
                return false;
            }
        } else {
            debug!("client `{}` not responded, closing", self.username);
            self.close().await;
        }
        responded
    }

    async fn close(&mut self) {
        if !self.is_socket_closed {
            self.detach();
            self.is_socket_closed = true;
            self.ping_token.abort();
            self.socket_token.abort();
            let _ = self.sink.close().await;
        }
    }

    fn detach(&mut self) {
        if !self.is_detached {
            self.is_detached = true;
            debug!("client `{}` left (id: {})", self.username, self.my_id);
            self.room.op.spawn().RemoveClient(self.my_id);
        }
    }
}

/// Decision for one inbound text frame.
#[derive(Debug, PartialEq, Eq)]
enum FrameAction {
    /// A chat to forward, attributed to the authenticated username.
    Forward { from: String, content: String },
    Leave,
    Ignore,
}

/// The `user` field of an inbound frame is never trusted; the authenticated
/// username from the join token is what the room sees.
fn dispatch_text(text: &str, username: &str) -> FrameAction {
    let message: Message = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            warn!("client `{username}` sent an unparseable frame: {err}");
            return FrameAction::Ignore;
        }
    };
    match message.r#type {
        MessageType::Chat => FrameAction::Forward {
            from: username.to_string(),
            content: message.content,
        },
        MessageType::Leave => FrameAction::Leave,
        MessageType::Join => {
            debug!("client `{username}` sent JOIN on an open socket, ignoring");
            FrameAction::Ignore
        }
    }
}
