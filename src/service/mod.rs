pub use auth_service::AuthService;
pub use chat_service::ChatService;
pub use room_service::ChatRoom;
pub use service_error::ServiceError;

mod auth_service;
mod chat_service;
mod client_service;
mod room_service;
mod service_error;

/// Handles to the long-lived service actors, cloned into every connection.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub chat: ChatService,
}

impl Services {
    pub fn create() -> Services {
        Services {
            auth: AuthService::create(),
            chat: ChatService::create(),
        }
    }
}
