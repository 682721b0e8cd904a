use hyper::header::AUTHORIZATION;
use hyper::{Method, StatusCode};
use log::debug;

use crate::misc::{
    read_json, respond_with_json, AppError, AppResult, HttpRequest, HttpResponse, QueryParams,
};
use crate::model::{ApiResponse, CreateRoomParams, User};
use crate::service::Services;

/// Entry point for every request; errors become `{"message": …}` bodies with
/// their status.
pub async fn handle(services: Services, req: HttpRequest) -> HttpResponse {
    match route(services, req).await {
        Ok(response) => response,
        Err(err) => {
            debug!("request failed: {err}");
            err.into_response()
        }
    }
}

async fn route(services: Services, req: HttpRequest) -> AppResult<HttpResponse> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    debug!("handle: {method} {path}");
    match Route::resolve(&method, &path)? {
        Route::Signup => signup(services, req).await,
        Route::Login => login(services, req).await,
        Route::ListRooms => list_rooms(services, req).await,
        Route::CreateRoom => create_room(services, req).await,
        Route::RoomStatus(room_id) => room_status(services, req, room_id).await,
        Route::RoomMessages(room_id) => room_messages(services, req, room_id).await,
        Route::JoinRoom(room_id) => join_room(services, req, room_id).await,
        Route::DestroyRoom(room_id) => destroy_room(services, req, room_id).await,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Signup,
    Login,
    ListRooms,
    CreateRoom,
    RoomStatus(String),
    RoomMessages(String),
    JoinRoom(String),
    DestroyRoom(String),
}

impl Route {
    fn resolve(method: &Method, path: &str) -> AppResult<Route> {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let route = match (method, segments.as_slice()) {
            (&Method::POST, ["signup"]) => Route::Signup,
            (&Method::POST, ["login"]) => Route::Login,
            (&Method::GET, ["rooms"]) => Route::ListRooms,
            (&Method::POST, ["rooms"]) => Route::CreateRoom,
            (&Method::GET, ["rooms", id]) => Route::RoomStatus((*id).to_string()),
            (&Method::GET, ["rooms", id, "messages"]) => Route::RoomMessages((*id).to_string()),
            (&Method::GET, ["rooms", id, "ws"]) => Route::JoinRoom((*id).to_string()),
            (&Method::DELETE, ["rooms", id]) => Route::DestroyRoom((*id).to_string()),
            _ => return Err(AppError::not_found(format!("no route for {method} {path}"))),
        };
        Ok(route)
    }
}

/// Resolve the `Authorization: Bearer …` header to a username.
async fn authorize(services: &Services, req: &HttpRequest) -> AppResult<String> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("missing authorization header".to_string()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("expected a bearer token".to_string()))?;
    Ok(services.auth.op.Verify(token.to_string()).await?)
}

async fn signup(services: Services, req: HttpRequest) -> AppResult<HttpResponse> {
    let credentials: User = read_json(req).await?;
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::bad_request(
            "username and password are required".to_string(),
        ));
    }
    let user = services
        .auth
        .op
        .Signup(credentials.username, credentials.password)
        .await?;
    Ok(respond_with_json(
        StatusCode::CREATED,
        &ApiResponse::with_message("user created", user),
    ))
}

async fn login(services: Services, req: HttpRequest) -> AppResult<HttpResponse> {
    let credentials: User = read_json(req).await?;
    let session = services
        .auth
        .op
        .Login(credentials.username, credentials.password)
        .await?;
    Ok(respond_with_json(StatusCode::OK, &ApiResponse::data(session)))
}

async fn list_rooms(services: Services, req: HttpRequest) -> AppResult<HttpResponse> {
    authorize(&services, &req).await?;
    let rooms = services.chat.op.ListRooms().await;
    Ok(respond_with_json(StatusCode::OK, &ApiResponse::data(rooms)))
}

async fn create_room(services: Services, req: HttpRequest) -> AppResult<HttpResponse> {
    let admin = authorize(&services, &req).await?;
    let params: CreateRoomParams = read_json(req).await?;
    let room_name = params.room_name.trim().to_string();
    if room_name.is_empty() {
        return Err(AppError::bad_request("room_name is required".to_string()));
    }
    let room = services.chat.op.CreateRoom(room_name, admin).await;
    Ok(respond_with_json(
        StatusCode::CREATED,
        &ApiResponse::with_message("room created", room),
    ))
}

async fn room_status(services: Services, req: HttpRequest, room_id: String) -> AppResult<HttpResponse> {
    authorize(&services, &req).await?;
    let room = services.chat.op.GetRoom(room_id).await?;
    let status = room.op.Status().await;
    Ok(respond_with_json(StatusCode::OK, &ApiResponse::data(status)))
}

async fn room_messages(
    services: Services,
    req: HttpRequest,
    room_id: String,
) -> AppResult<HttpResponse> {
    authorize(&services, &req).await?;
    let room = services.chat.op.GetRoom(room_id).await?;
    let messages = room.op.Messages().await;
    Ok(respond_with_json(StatusCode::OK, &ApiResponse::data(messages)))
}

/// Browser WebSocket clients cannot set headers, so the join token rides the
/// query string.
async fn join_room(services: Services, req: HttpRequest, room_id: String) -> AppResult<HttpResponse> {
    let token = QueryParams::parse(req.uri().query()).require("token")?;
    let username = services.auth.op.Verify(token).await?;
    let room = services.chat.op.GetRoom(room_id).await?;
    room.join(req, username).await
}

async fn destroy_room(
    services: Services,
    req: HttpRequest,
    room_id: String,
) -> AppResult<HttpResponse> {
    let username = authorize(&services, &req).await?;
    let room = services.chat.op.GetRoom(room_id).await?;
    if room.room.admin != username {
        return Err(AppError::forbidden(
            "only the room admin can destroy it".to_string(),
        ));
    }
    room.op.Destroy().await;
    Ok(respond_with_json(
        StatusCode::OK,
        &ApiResponse::message("room destroyed".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use hyper::Method;

    use crate::app::handlers::Route;

    #[test]
    fn resolves_the_service_surface() {
        assert_eq!(Route::resolve(&Method::POST, "/signup").unwrap(), Route::Signup);
        assert_eq!(Route::resolve(&Method::POST, "/login").unwrap(), Route::Login);
        assert_eq!(Route::resolve(&Method::GET, "/rooms").unwrap(), Route::ListRooms);
        assert_eq!(Route::resolve(&Method::POST, "/rooms").unwrap(), Route::CreateRoom);
        assert_eq!(
            Route::resolve(&Method::GET, "/rooms/r1").unwrap(),
            Route::RoomStatus("r1".to_string())
        );
        assert_eq!(
            Route::resolve(&Method::GET, "/rooms/r1/messages").unwrap(),
            Route::RoomMessages("r1".to_string())
        );
        assert_eq!(
            Route::resolve(&Method::GET, "/rooms/r1/ws").unwrap(),
            Route::JoinRoom("r1".to_string())
        );
        assert_eq!(
            Route::resolve(&Method::DELETE, "/rooms/r1").unwrap(),
            Route::DestroyRoom("r1".to_string())
        );
        // trailing slashes are tolerated
        assert_eq!(Route::resolve(&Method::GET, "/rooms/").unwrap(), Route::ListRooms);
    }

    #[test]
    fn everything_else_is_not_found() {
        assert!(Route::resolve(&Method::GET, "/").is_err());
        assert!(Route::resolve(&Method::GET, "/signup").is_err());
        assert!(Route::resolve(&Method::PUT, "/rooms").is_err());
        assert!(Route::resolve(&Method::GET, "/rooms/r1/ws/extra").is_err());
    }
}
