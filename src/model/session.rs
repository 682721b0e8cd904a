use serde::Serialize;

/// Issued on login; the token authorizes subsequent requests.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub username: String,
    pub token: String,
}
