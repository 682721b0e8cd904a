use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

use crate::misc::{AppError, AppResult, HttpRequest};

/// Collect a request body and parse it as JSON.
pub async fn read_json<T: DeserializeOwned>(req: HttpRequest) -> AppResult<T> {
    let bytes = req
        .into_body()
        .collect()
        .await
        .map_err(|err| AppError::bad_request(format!("error reading request body: {err}")))?
        .to_bytes();
    serde_json::from_slice(&bytes)
        .map_err(|err| AppError::bad_request(format!("invalid json body: {err}")))
}
