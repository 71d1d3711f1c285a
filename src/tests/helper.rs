use axum::body::Body;
use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::COOKIE;
use axum::http::header::SET_COOKIE;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Map;
use serde_json::Value;
use tower::Service;

use crate::create_router;
use crate::storage::Memory;

/// Setup the TravelEase app against a fresh in-memory storage
pub async fn setup_test_app() -> Router {
    create_router(Memory::new())
}

/// Send a request and collect status plus parsed JSON body
pub async fn send(
    app: &mut Router,
    method: Method,
    uri: &str,
    session: Option<&str>,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(session) = session {
        builder = builder.header(COOKIE, session);
    }

    let request = if let Some(payload) = payload {
        builder
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, parse_body(&body))
}

fn parse_body(body: &Bytes) -> Value {
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&body[..]).unwrap()
    }
}

/// Register a user and hand back the session cookie
pub async fn register(app: &mut Router, username: &str) -> String {
    let (status_code, session, _) = maybe_register(app, username).await;

    assert_eq!(StatusCode::CREATED, status_code);

    session.unwrap()
}

/// Register a user, keeping failures visible
pub async fn maybe_register(
    app: &mut Router,
    username: &str,
) -> (StatusCode, Option<String>, Value) {
    let mut payload = Map::new();
    payload.insert("username".to_string(), Value::String(username.to_string()));
    payload.insert(
        "email".to_string(),
        Value::String(format!("{username}@example.com")),
    );
    payload.insert(
        "password".to_string(),
        Value::String("verysecret".to_string()),
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let session = response
        .headers()
        .get(SET_COOKIE)
        .map(|header| session_cookie(header.to_str().unwrap()));

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, session, parse_body(&body))
}

/// Log a user in and hand back the session cookie on success
pub async fn login(
    app: &mut Router,
    username: &str,
    password: &str,
) -> (StatusCode, Option<String>) {
    let mut payload = Map::new();
    payload.insert("username".to_string(), Value::String(username.to_string()));
    payload.insert("password".to_string(), Value::String(password.to_string()));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let session = if status_code == StatusCode::OK {
        response
            .headers()
            .get(SET_COOKIE)
            .map(|header| session_cookie(header.to_str().unwrap()))
    } else {
        None
    };

    (status_code, session)
}

/// Log the user of the session out
pub async fn logout(app: &mut Router, session: &str) -> StatusCode {
    let (status_code, _) = send(app, Method::POST, "/api/auth/logout", Some(session), None).await;

    status_code
}

/// Create a trip and hand back its id
pub async fn create_trip(app: &mut Router, session: &str, title: &str) -> i64 {
    let mut payload = Map::new();
    payload.insert("title".to_string(), Value::String(title.to_string()));

    let (status_code, trip_id, _) = maybe_create_trip(app, session, Value::Object(payload)).await;

    assert_eq!(StatusCode::CREATED, status_code);

    trip_id.unwrap()
}

/// Create a trip from a raw payload, keeping failures visible
pub async fn maybe_create_trip(
    app: &mut Router,
    session: &str,
    payload: Value,
) -> (StatusCode, Option<i64>, Option<String>) {
    let (status_code, body) =
        send(app, Method::POST, "/api/trips", Some(session), Some(payload)).await;

    (
        status_code,
        body["trip_id"].as_i64(),
        error_message(&body),
    )
}

/// Add a destination to a trip and hand back its id
pub async fn create_destination(
    app: &mut Router,
    session: &str,
    trip_id: i64,
    name: &str,
    arrival_date: Option<&str>,
) -> i64 {
    let mut payload = Map::new();
    payload.insert(
        "destination_name".to_string(),
        Value::String(name.to_string()),
    );

    if let Some(arrival_date) = arrival_date {
        payload.insert(
            "arrival_date".to_string(),
            Value::String(arrival_date.to_string()),
        );
    }

    let (status_code, body) = send(
        app,
        Method::POST,
        &format!("/api/trips/{trip_id}/destinations"),
        Some(session),
        Some(Value::Object(payload)),
    )
    .await;

    assert_eq!(StatusCode::CREATED, status_code);

    body["destination_id"].as_i64().unwrap()
}

/// Add an activity to a trip from a raw payload
pub async fn create_activity(
    app: &mut Router,
    session: &str,
    trip_id: i64,
    payload: Value,
) -> (StatusCode, Option<i64>, Option<String>) {
    let (status_code, body) = send(
        app,
        Method::POST,
        &format!("/api/trips/{trip_id}/activities"),
        Some(session),
        Some(payload),
    )
    .await;

    (
        status_code,
        body["activity_id"].as_i64(),
        error_message(&body),
    )
}

/// Add an accommodation to a trip from a raw payload
pub async fn create_accommodation(
    app: &mut Router,
    session: &str,
    trip_id: i64,
    payload: Value,
) -> (StatusCode, Option<i64>, Option<String>) {
    let (status_code, body) = send(
        app,
        Method::POST,
        &format!("/api/trips/{trip_id}/accommodations"),
        Some(session),
        Some(payload),
    )
    .await;

    (
        status_code,
        body["accommodation_id"].as_i64(),
        error_message(&body),
    )
}

/// Pull the error message out of an error body, when there is one
pub fn error_message(body: &Value) -> Option<String> {
    body["error"].as_str().map(ToString::to_string)
}

/// Reduce a `Set-Cookie` header to the bare `name=value` pair
fn session_cookie(header: &str) -> String {
    header
        .split(';')
        .next()
        .map(ToString::to_string)
        .unwrap()
}
