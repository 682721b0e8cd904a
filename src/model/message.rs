use serde::{Deserialize, Serialize};

/// The closed set of kinds a room message may carry. Anything else on the
/// wire is a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "JOIN")]
    Join,
    #[serde(rename = "LEAVE")]
    Leave,
    #[serde(rename = "CHAT")]
    Chat,
}

/// A single frame on a room socket, in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub user: String,
    pub r#type: MessageType,
    pub content: String,
}

impl Message {
    pub fn joined(user: String) -> Message {
        Message {
            user,
            r#type: MessageType::Join,
            content: String::new(),
        }
    }

    pub fn left(user: String) -> Message {
        Message {
            user,
            r#type: MessageType::Leave,
            content: String::new(),
        }
    }

    pub fn chat(user: String, content: String) -> Message {
        Message {
            user,
            r#type: MessageType::Chat,
            content,
        }
    }
}
