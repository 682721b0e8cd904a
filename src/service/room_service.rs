use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::command;
use crate::config::HISTORY_LIMIT;
use crate::misc::{AppError, AppResult, HttpRequest, HttpResponse};
use crate::model::{Message, Room, RoomStatus};
use crate::service::client_service::ChatClient;

command! {
    pub Status() -> RoomStatus;
    /// Snapshot of the room's message history, oldest first.
    pub Messages() -> Vec<Message>;
    pub AddClient(client: ChatClient);
    pub RemoveClient(id: usize);
    pub SendChat(from: String, content: String);
    pub GetNextId() -> usize;
    pub Destroy();
}

#[derive(Clone)]
pub struct ChatRoom {
    pub room: Arc<Room>,
    pub op: CommandSender,
}

impl ChatRoom {
    pub fn create(room: Room, on_detach: impl FnOnce(String) + Send + 'static) -> ChatRoom {
        let (op, mut rx) = Command::new_channel();
        let chat_room = ChatRoom {
            room: Arc::new(room.clone()),
            op,
        };
        tokio::spawn(async move {
            let mut state = RoomInner {
                room,
                clients: Vec::new(),
                messages: Vec::new(),
                next_id: 0,
                created_at: Utc::now(),
                detached: false,
                on_detach: Some(Box::new(on_detach)),
            };
            while let Some(command) = rx.recv().await {
                // a dropped reply receiver only means the caller went away
                match command {
                    Command::Status { resp_tx } => {
                        let _ = resp_tx.send(state.status());
                    }
                    Command::Messages { resp_tx } => {
                        let _ = resp_tx.send(state.messages.clone());
                    }
                    Command::AddClient { client, resp_tx } => {
                        state.add_client(client);
                        let _ = resp_tx.send(());
                    }
                    Command::RemoveClient { id, resp_tx } => {
                        state.remove_client(id);
                        let _ = resp_tx.send(());
                    }
                    Command::SendChat { from, content, resp_tx } => {
                        state.record_and_broadcast(Message::chat(from, content));
                        let _ = resp_tx.send(());
                    }
                    Command::GetNextId { resp_tx } => {
                        state.next_id += 1;
                        let _ = resp_tx.send(state.next_id);
                    }
                    Command::Destroy { resp_tx } => {
                        state.destroy().await;
                        let _ = resp_tx.send(());
                    }
                }
            }
        });
        chat_room
    }

    /// Upgrade the request to a WebSocket and attach it to this room as
    /// `username`.
    pub async fn join(&self, req: HttpRequest, username: String) -> AppResult<HttpResponse> {
        use hyper_tungstenite::{is_upgrade_request, upgrade};
        if !is_upgrade_request(&req) {
            return Err(AppError::bad_request(
                "the request is not upgradable to web socket".to_string(),
            ));
        }
        let (response, websocket) = upgrade(req, None)
            .map_err(|err| AppError::bad_request(format!("web socket handshake failed: {err}")))?;
        let this = self.clone();
        tokio::spawn(async move {
            let id = this.op.GetNextId().await;
            match ChatClient::create(websocket, this.clone(), username, id).await {
                Ok(client) => this.op.AddClient(client).await,
                Err(err) => warn!("web socket upgrade failed: {err}"),
            }
        });
        // The handshake response must go out so the spawned future can
        // complete the upgrade.
        Ok(response)
    }
}

struct RoomInner {
    room: Room,
    clients: Vec<ChatClient>,
    messages: Vec<Message>,
    next_id: usize,
    created_at: DateTime<Utc>,
    detached: bool,
    on_detach: Option<Box<dyn FnOnce(String) + Send>>,
}

impl RoomInner {
    fn status(&self) -> RoomStatus {
        RoomStatus {
            room: self.room.clone(),
            participants: self.clients.iter().map(|e| e.username.clone()).collect(),
            messages: self.messages.len(),
            created_at: self.created_at,
        }
    }

    fn add_client(&mut self, client: ChatClient) {
        if self.detached {
            // lost the race against destroy
            client.op.spawn().Close();
            return;
        }
        let username = client.username.clone();
        self.clients.push(client);
        debug!(
            "room `{}`: client `{username}` joined (size: {})",
            self.room.room_name,
            self.clients.len()
        );
        self.record_and_broadcast(Message::joined(username));
    }

    fn remove_client(&mut self, id: usize) {
        let Some(index) = self.clients.iter().position(|e| e.id == id) else {
            return;
        };
        let client = self.clients.remove(index);
        debug!(
            "room `{}`: client `{}` left (size: {})",
            self.room.room_name,
            client.username,
            self.clients.len()
        );
        self.record_and_broadcast(Message::left(client.username));
    }

    fn record_and_broadcast(&mut self, message: Message) {
        match serde_json::to_string(&message) {
            Ok(body) => self.broadcast(body),
            Err(err) => error!("error encoding message from `{}`: {err}", message.user),
        }
        if self.messages.len() == HISTORY_LIMIT {
            self.messages.remove(0);
        }
        self.messages.push(message);
    }

    fn broadcast(&self, body: String) {
        for client in &self.clients {
            client.op.spawn().Send(body.clone());
        }
    }

    async fn destroy(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        for client in &self.clients {
            client.op.Close().await;
        }
        self.clients.clear();
        if let Some(on_detach) = self.on_detach.take() {
            info!("room `{}` destroyed", self.room.room_name);
            on_detach(self.room.room_id.clone());
        }
    }
}
