use axum::http::Method;
use axum::http::StatusCode;
use serde_json::json;

use crate::tests::helper;

#[tokio::test]
async fn test_detail_of_missing_trip() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let (status_code, body) =
        helper::send(&mut app, Method::GET, "/api/trips/42", Some(&session), None).await;

    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(
        Some("Trip not found".to_string()),
        helper::error_message(&body)
    );
}

#[tokio::test]
async fn test_destinations_ordered_with_undated_last() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let trip_id = helper::create_trip(&mut app, &session, "Summer in Portugal").await;

    helper::create_destination(&mut app, &session, trip_id, "Faro", None).await;
    helper::create_destination(&mut app, &session, trip_id, "Porto", Some("2025-07-05")).await;
    helper::create_destination(&mut app, &session, trip_id, "Lisbon", Some("2025-07-01")).await;

    let (status_code, body) = helper::send(
        &mut app,
        Method::GET,
        &format!("/api/trips/{trip_id}"),
        Some(&session),
        None,
    )
    .await;

    assert_eq!(StatusCode::OK, status_code);

    let names = body["destinations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|destination| destination["destination_name"].as_str().unwrap())
        .collect::<Vec<&str>>();

    assert_eq!(vec!["Lisbon", "Porto", "Faro"], names);
}

#[tokio::test]
async fn test_activities_ordered_and_enriched() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let trip_id = helper::create_trip(&mut app, &session, "Summer in Lisbon").await;
    let destination_id =
        helper::create_destination(&mut app, &session, trip_id, "Lisbon", None).await;

    helper::create_activity(
        &mut app,
        &session,
        trip_id,
        json!({ "activity_name": "Fado night" }),
    )
    .await;
    helper::create_activity(
        &mut app,
        &session,
        trip_id,
        json!({
            "activity_name": "Tram 28 ride",
            "activity_date": "2025-07-02",
            "activity_time": "14:30",
            "destination_id": destination_id,
        }),
    )
    .await;
    helper::create_activity(
        &mut app,
        &session,
        trip_id,
        json!({
            "activity_name": "Castle visit",
            "activity_date": "2025-07-02",
            "activity_time": "09:00",
        }),
    )
    .await;

    let (_, body) = helper::send(
        &mut app,
        Method::GET,
        &format!("/api/trips/{trip_id}"),
        Some(&session),
        None,
    )
    .await;

    let activities = body["activities"].as_array().unwrap();

    // dated entries first, ordered by day then time of day, undated last
    assert_eq!("Castle visit", activities[0]["activity_name"]);
    assert_eq!("Tram 28 ride", activities[1]["activity_name"]);
    assert_eq!("Fado night", activities[2]["activity_name"]);

    // the destination name is joined in, null when there is no link
    assert_eq!("Lisbon", activities[1]["destination_name"]);
    assert!(activities[0]["destination_name"].is_null());
}

#[tokio::test]
async fn test_accommodations_ordered_by_check_in() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let trip_id = helper::create_trip(&mut app, &session, "Summer in Lisbon").await;

    helper::create_accommodation(
        &mut app,
        &session,
        trip_id,
        json!({ "accommodation_name": "Crash at a friend" }),
    )
    .await;
    helper::create_accommodation(
        &mut app,
        &session,
        trip_id,
        json!({ "accommodation_name": "Hotel Mundial", "check_in": "2025-07-01" }),
    )
    .await;

    let (_, body) = helper::send(
        &mut app,
        Method::GET,
        &format!("/api/trips/{trip_id}"),
        Some(&session),
        None,
    )
    .await;

    let accommodations = body["accommodations"].as_array().unwrap();

    assert_eq!("Hotel Mundial", accommodations[0]["accommodation_name"]);
    assert_eq!("Crash at a friend", accommodations[1]["accommodation_name"]);
}

#[tokio::test]
async fn test_deleting_destination_unlinks_children() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let trip_id = helper::create_trip(&mut app, &session, "Summer in Lisbon").await;
    let destination_id =
        helper::create_destination(&mut app, &session, trip_id, "Lisbon", None).await;

    helper::create_activity(
        &mut app,
        &session,
        trip_id,
        json!({ "activity_name": "Tram 28 ride", "destination_id": destination_id }),
    )
    .await;

    let (status_code, body) = helper::send(
        &mut app,
        Method::DELETE,
        &format!("/api/trips/{trip_id}/destinations/{destination_id}"),
        Some(&session),
        None,
    )
    .await;

    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("Destination deleted successfully", body["message"]);

    let (_, body) = helper::send(
        &mut app,
        Method::GET,
        &format!("/api/trips/{trip_id}"),
        Some(&session),
        None,
    )
    .await;

    // the activity survives, without the destination link
    let activities = body["activities"].as_array().unwrap();
    assert_eq!(1, activities.len());
    assert!(activities[0]["destination_id"].is_null());
    assert!(activities[0]["destination_name"].is_null());

    assert!(body["destinations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_activity_rejects_foreign_destination() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let trip_id = helper::create_trip(&mut app, &session, "Summer in Lisbon").await;
    let other_trip_id = helper::create_trip(&mut app, &session, "Winter in Vienna").await;
    let other_destination_id =
        helper::create_destination(&mut app, &session, other_trip_id, "Vienna", None).await;

    let (status_code, _, error) = helper::create_activity(
        &mut app,
        &session,
        trip_id,
        json!({ "activity_name": "Tram 28 ride", "destination_id": other_destination_id }),
    )
    .await;

    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Destination does not belong to this trip".to_string()),
        error
    );
}

#[tokio::test]
async fn test_activity_rejects_bad_time() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let trip_id = helper::create_trip(&mut app, &session, "Summer in Lisbon").await;

    let (status_code, _, error) = helper::create_activity(
        &mut app,
        &session,
        trip_id,
        json!({ "activity_name": "Tram 28 ride", "activity_time": "2pm" }),
    )
    .await;

    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid time format. Use HH:MM".to_string()), error);
}

#[tokio::test]
async fn test_child_names_are_required() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let trip_id = helper::create_trip(&mut app, &session, "Summer in Lisbon").await;

    let (status_code, body) = helper::send(
        &mut app,
        Method::POST,
        &format!("/api/trips/{trip_id}/destinations"),
        Some(&session),
        Some(json!({})),
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Destination name is required".to_string()),
        helper::error_message(&body)
    );

    let (status_code, _, error) =
        helper::create_activity(&mut app, &session, trip_id, json!({})).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Activity name is required".to_string()), error);

    let (status_code, _, error) =
        helper::create_accommodation(&mut app, &session, trip_id, json!({})).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Accommodation name is required".to_string()), error);
}

#[tokio::test]
async fn test_delete_missing_children() {
    let mut app = helper::setup_test_app().await;
    let session = helper::register(&mut app, "wanderer").await;

    let trip_id = helper::create_trip(&mut app, &session, "Summer in Lisbon").await;

    let (status_code, body) = helper::send(
        &mut app,
        Method::DELETE,
        &format!("/api/trips/{trip_id}/destinations/42"),
        Some(&session),
        None,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(
        Some("Destination not found".to_string()),
        helper::error_message(&body)
    );

    let (status_code, _) = helper::send(
        &mut app,
        Method::DELETE,
        &format!("/api/trips/{trip_id}/activities/42"),
        Some(&session),
        None,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    let (status_code, _) = helper::send(
        &mut app,
        Method::DELETE,
        &format!("/api/trips/{trip_id}/accommodations/42"),
        Some(&session),
        None,
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
}
