use std::collections::HashMap;

use log::info;
use uuid::Uuid;

use crate::command;
use crate::model::Room;
use crate::service::{ChatRoom, ServiceError};

command! {
    pub CreateRoom(room_name: String, admin: String) -> Room;
    pub ListRooms() -> Vec<Room>;
    pub GetRoom(room_id: String) -> Result<ChatRoom, ServiceError>;
    /// Invoked by a room's detach callback once it has been destroyed.
    pub DetachRoom(room_id: String);
}

#[derive(Clone)]
pub struct ChatService {
    pub op: CommandSender,
}

impl ChatService {
    pub fn create() -> ChatService {
        let (op, mut rx) = Command::new_channel();
        let service = ChatService { op: op.clone() };
        tokio::spawn(async move {
            let mut state = ChatServiceInner::default();
            while let Some(command) = rx.recv().await {
                // a dropped reply receiver only means the caller went away
                match command {
                    Command::CreateRoom { room_name, admin, resp_tx } => {
                        let _ = resp_tx.send(state.create_room(room_name, admin, &op));
                    }
                    Command::ListRooms { resp_tx } => {
                        let _ = resp_tx.send(state.list_rooms());
                    }
                    Command::GetRoom { room_id, resp_tx } => {
                        let _ = resp_tx.send(state.get_room(&room_id));
                    }
                    Command::DetachRoom { room_id, resp_tx } => {
                        state.detach_room(&room_id);
                        let _ = resp_tx.send(());
                    }
                }
            }
        });
        service
    }
}

#[derive(Default)]
struct ChatServiceInner {
    rooms: HashMap<String, ChatRoom>,
}

impl ChatServiceInner {
    fn create_room(&mut self, room_name: String, admin: String, op: &CommandSender) -> Room {
        let room = Room {
            room_id: Uuid::new_v4().to_string(),
            room_name,
            admin,
        };
        let op = op.clone();
        let instance = ChatRoom::create(room.clone(), move |room_id| {
            op.spawn().DetachRoom(room_id)
        });
        self.rooms.insert(room.room_id.clone(), instance);
        info!(
            "room `{}` created by `{}` (total: {})",
            room.room_name,
            room.admin,
            self.rooms.len()
        );
        room
    }

    fn list_rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .values()
            .map(|instance| instance.room.as_ref().clone())
            .collect();
        rooms.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        rooms
    }

    fn get_room(&self, room_id: &str) -> Result<ChatRoom, ServiceError> {
        match self.rooms.get(room_id) {
            Some(instance) => Ok(instance.clone()),
            None => Err(ServiceError::RoomNotFound),
        }
    }

    fn detach_room(&mut self, room_id: &str) {
        if self.rooms.remove(room_id).is_some() {
            info!("room `{room_id}` detached (total: {})", self.rooms.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::service::{ChatService, ServiceError};

    #[tokio::test]
    async fn created_rooms_are_listed_and_reachable() {
        let chat = ChatService::create();
        let room = chat
            .op
            .CreateRoom("general".to_string(), "alice".to_string())
            .await;
        assert_eq!(room.room_name, "general");
        assert_eq!(room.admin, "alice");
        assert!(!room.room_id.is_empty());

        chat.op
            .CreateRoom("another".to_string(), "bob".to_string())
            .await;
        let rooms = chat.op.ListRooms().await;
        assert_eq!(rooms.len(), 2);
        // sorted by name
        assert_eq!(rooms[0].room_name, "another");
        assert_eq!(rooms[1].room_name, "general");

        let instance = chat.op.GetRoom(room.room_id.clone()).await.unwrap();
        assert_eq!(instance.room.room_id, room.room_id);
    }

    #[tokio::test]
    async fn unknown_rooms_are_not_found() {
        let chat = ChatService::create();
        assert!(matches!(
            chat.op.GetRoom("missing".to_string()).await,
            Err(ServiceError::RoomNotFound)
        ));
    }

    #[tokio::test]
    async fn an_abandoned_command_does_not_kill_the_registry() {
        let chat = ChatService::create();
        // enqueue a command, then drop the reply receiver before it is answered
        let _ = tokio::time::timeout(
            std::time::Duration::ZERO,
            chat.op.CreateRoom("general".to_string(), "alice".to_string()),
        )
        .await;
        chat.op
            .CreateRoom("another".to_string(), "bob".to_string())
            .await;
        assert_eq!(chat.op.ListRooms().await.len(), 2);
    }

    #[tokio::test]
    async fn destroying_a_room_detaches_it() {
        let chat = ChatService::create();
        let room = chat
            .op
            .CreateRoom("doomed".to_string(), "alice".to_string())
            .await;
        let instance = chat.op.GetRoom(room.room_id.clone()).await.unwrap();
        instance.op.Destroy().await;
        // detach is a spawned callback; poll until the registry catches up
        for _ in 0..50 {
            if chat.op.ListRooms().await.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(chat.op.ListRooms().await.is_empty());
        assert!(matches!(
            chat.op.GetRoom(room.room_id).await,
            Err(ServiceError::RoomNotFound)
        ));
    }
}
