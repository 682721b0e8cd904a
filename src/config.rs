use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const PING_INTERVAL: Duration = Duration::from_secs(120);
/// Mailbox depth shared by every actor channel.
pub const COMMAND_BUFFER: usize = 30;
/// Per-room message history cap; the oldest entry is dropped first.
pub const HISTORY_LIMIT: usize = 500;

/// Listen port, overridable through the `PORT` environment variable.
pub fn port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
