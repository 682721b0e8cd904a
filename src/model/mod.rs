pub use message::{Message, MessageType};
pub use params::CreateRoomParams;
pub use response::ApiResponse;
pub use room::Room;
pub use room_status::RoomStatus;
pub use session::Session;
pub use user::User;

mod message;
mod params;
mod response;
mod room;
mod room_status;
mod session;
mod user;
