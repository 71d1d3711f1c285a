use axum::http::Method;
use axum::http::StatusCode;
use serde_json::json;

use crate::tests::helper;

#[tokio::test]
async fn test_register_login_logout_round_trip() {
    let mut app = helper::setup_test_app().await;

    let session = helper::register(&mut app, "wanderer").await;

    // the register session authenticates right away
    let (status_code, body) =
        helper::send(&mut app, Method::GET, "/api/user", Some(&session), None).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("wanderer", body["username"]);

    // logout invalidates the session server side
    assert_eq!(StatusCode::OK, helper::logout(&mut app, &session).await);

    let (status_code, body) =
        helper::send(&mut app, Method::GET, "/api/user", Some(&session), None).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!(
        Some("Authentication required".to_string()),
        helper::error_message(&body)
    );

    // a fresh login hands out a fresh session
    let (status_code, session) = helper::login(&mut app, "wanderer", "verysecret").await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, _) =
        helper::send(&mut app, Method::GET, "/api/user", session.as_deref(), None).await;
    assert_eq!(StatusCode::OK, status_code);
}

#[tokio::test]
async fn test_register_requires_fields() {
    let mut app = helper::setup_test_app().await;

    let (status_code, body) = helper::send(
        &mut app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "wanderer", "email": "wanderer@example.com" })),
    )
    .await;

    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Username, email and password are required".to_string()),
        helper::error_message(&body)
    );

    // empty strings count as missing
    let (status_code, _) = helper::send(
        &mut app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "", "email": "a@example.com", "password": "verysecret" })),
    )
    .await;

    assert_eq!(StatusCode::BAD_REQUEST, status_code);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let mut app = helper::setup_test_app().await;

    helper::register(&mut app, "wanderer").await;

    let (status_code, _, body) = helper::maybe_register(&mut app, "wanderer").await;

    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Username already exists".to_string()),
        helper::error_message(&body)
    );
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let mut app = helper::setup_test_app().await;

    helper::register(&mut app, "wanderer").await;

    let (status_code, body) = helper::send(
        &mut app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "other",
            "email": "wanderer@example.com",
            "password": "verysecret",
        })),
    )
    .await;

    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Email already exists".to_string()),
        helper::error_message(&body)
    );
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let mut app = helper::setup_test_app().await;

    helper::register(&mut app, "wanderer").await;

    let (status_code, session) = helper::login(&mut app, "wanderer", "notverysecret").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert!(session.is_none());

    // an unknown user answers exactly the same
    let (status_code, _) = helper::login(&mut app, "nobody", "verysecret").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
}

#[tokio::test]
async fn test_logout_without_session() {
    let mut app = helper::setup_test_app().await;

    let (status_code, body) =
        helper::send(&mut app, Method::POST, "/api/auth/logout", None, None).await;

    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("Logged out successfully", body["message"]);
}

#[tokio::test]
async fn test_protected_routes_require_authentication() {
    let mut app = helper::setup_test_app().await;

    let (status_code, body) = helper::send(&mut app, Method::GET, "/api/trips", None, None).await;

    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!(
        Some("Authentication required".to_string()),
        helper::error_message(&body)
    );

    // a cookie that does not hold a session token is just as unauthenticated
    let (status_code, _) = helper::send(
        &mut app,
        Method::GET,
        "/api/trips",
        Some("travelease_session=not-a-token"),
        None,
    )
    .await;

    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
}
