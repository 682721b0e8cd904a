use serde::Serialize;

/// REST body envelope. The web client reads `data` on success and `message`
/// on failure, so absent halves are omitted rather than sent as null.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> ApiResponse<T> {
        ApiResponse {
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: &str, data: T) -> ApiResponse<T> {
        ApiResponse {
            message: Some(message.to_string()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: String) -> ApiResponse<()> {
        ApiResponse {
            message: Some(message),
            data: None,
        }
    }
}
