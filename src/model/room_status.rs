use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Room;

/// Live view of a room: who is connected and how much history it holds.
#[derive(Debug, Serialize)]
pub struct RoomStatus {
    pub room: Room,
    pub participants: Vec<String>,
    pub messages: usize,
    #[serde(with = "crate::misc::date_serde")]
    pub created_at: DateTime<Utc>,
}
