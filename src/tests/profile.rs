use axum::http::Method;
use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_profile_of_current_user() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let (status_code, body) =
        helper::send(&mut app, Method::GET, "/api/user", Some(&session), None).await;

    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("wanderer", body["username"]);
    assert_eq!("wanderer@example.com", body["email"]);
    assert!(body["id"].as_i64().is_some());
    assert!(body["created_at"].as_str().is_some());

    // the hash stays inside, no matter what
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_profile_requires_authentication() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _) = helper::send(&mut app, Method::GET, "/api/user", None, None).await;

    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
}
