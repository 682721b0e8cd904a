use std::error::Error;
use std::fmt::{Display, Formatter};

use hyper::StatusCode;

use crate::misc::{respond_with_json, HttpResponse, ParseParamError};
use crate::model::ApiResponse;
use crate::service::ServiceError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub code: StatusCode,
    pub message: Option<String>,
}

impl AppError {
    pub fn bad_request(message: String) -> AppError {
        AppError {
            code: StatusCode::BAD_REQUEST,
            message: Some(message),
        }
    }

    pub fn unauthorized(message: String) -> AppError {
        AppError {
            code: StatusCode::UNAUTHORIZED,
            message: Some(message),
        }
    }

    pub fn forbidden(message: String) -> AppError {
        AppError {
            code: StatusCode::FORBIDDEN,
            message: Some(message),
        }
    }

    pub fn not_found(message: String) -> AppError {
        AppError {
            code: StatusCode::NOT_FOUND,
            message: Some(message),
        }
    }

    pub fn into_response(self) -> HttpResponse {
        let body = ApiResponse::message(
            self.message
                .unwrap_or_else(|| "request failed".to_string()),
        );
        respond_with_json(self.code, &body)
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, match &self.message {
            None => "null",
            Some(msg) => msg.as_str(),
        })
    }
}

impl Error for AppError {}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> AppError {
        let code = match err {
            ServiceError::UsernameTaken => StatusCode::CONFLICT,
            ServiceError::InvalidCredentials | ServiceError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::RoomNotFound => StatusCode::NOT_FOUND,
        };
        AppError {
            code,
            message: Some(err.to_string()),
        }
    }
}

impl From<ParseParamError<'_>> for AppError {
    fn from(err: ParseParamError) -> AppError {
        match err {
            ParseParamError::FieldRequired { name } => {
                AppError::bad_request(format!("{name} is required"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    use crate::misc::AppError;
    use crate::service::ServiceError;

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(AppError::from(ServiceError::UsernameTaken).code, StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(ServiceError::InvalidToken).code,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::from(ServiceError::RoomNotFound).code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn error_body_is_a_message_envelope() {
        let response = AppError::not_found("no such room".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"message":"no such room"}"#);
    }
}
