use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateRoomParams {
    pub room_name: String,
}
