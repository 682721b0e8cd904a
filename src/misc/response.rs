use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use log::error;
use serde::Serialize;

use crate::misc::HttpResponse;

/// Serialize `payload` and write it as a JSON response with `status`.
///
/// The status and content type are committed regardless of the payload: if
/// encoding fails, the failure is logged and the response goes out with an
/// empty body, since there is nothing else left to do for this request.
pub fn respond_with_json<T: Serialize>(status: StatusCode, payload: &T) -> HttpResponse {
    let body = match serde_json::to_vec(payload) {
        Ok(body) => Bytes::from(body),
        Err(err) => {
            error!(
                "error encoding {} payload: {err}",
                std::any::type_name::<T>()
            );
            Bytes::new()
        }
    };
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(body))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;
    use hyper::StatusCode;
    use serde::ser::Error as _;
    use serde::{Serialize, Serializer};
    use serde_json::{json, Value};

    use crate::misc::respond_with_json;

    #[tokio::test]
    async fn sets_status_content_type_and_body() {
        let payload = json!({"room_id": "a1", "room_name": "general", "admin": "alice"});
        let response = respond_with_json(StatusCode::CREATED, &payload);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed, payload);
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to encode"))
        }
    }

    #[tokio::test]
    async fn encoding_failure_keeps_the_status_and_empties_the_body() {
        let response = respond_with_json(StatusCode::OK, &Unencodable);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
