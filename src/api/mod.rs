//! All API endpoint setup

use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use chrono::Utc;
use serde::Serialize;

use crate::storage::Storage;

pub use current_user::CurrentUser;
pub use request::Form;
pub use request::PathParameters;
pub use response::Error;
pub use response::Message;
pub use response::Success;

mod auth;
mod current_user;
mod request;
mod response;
mod trips;
mod users;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let auth = Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/logout", post(auth::logout::<S>));

    let trips = Router::new()
        .route("/", get(trips::list::<S>).post(trips::create::<S>))
        .route(
            "/:trip",
            get(trips::single::<S>)
                .put(trips::update::<S>)
                .delete(trips::delete::<S>),
        )
        .route("/:trip/destinations", post(trips::create_destination::<S>))
        .route(
            "/:trip/destinations/:destination",
            delete(trips::delete_destination::<S>),
        )
        .route("/:trip/activities", post(trips::create_activity::<S>))
        .route(
            "/:trip/activities/:activity",
            delete(trips::delete_activity::<S>),
        )
        .route(
            "/:trip/accommodations",
            post(trips::create_accommodation::<S>),
        )
        .route(
            "/:trip/accommodations/:accommodation",
            delete(trips::delete_accommodation::<S>),
        );

    let user = Router::new()
        .route("/", get(users::profile::<S>))
        .route("/stats", get(users::stats::<S>));

    Router::new()
        .nest("/auth", auth)
        .nest("/trips", trips)
        .nest("/user", user)
        .route("/health", get(health))
}

/// Service banner at the root of the server
pub async fn root() -> Success<Message> {
    Success::ok(Message {
        message: "TravelEase API is running!",
    })
}

/// Health check response
#[derive(Serialize)]
struct Health {
    /// Always healthy when the server answers at all
    status: &'static str,

    /// Current server time, ISO 8601
    timestamp: String,
}

/// Health check
async fn health() -> Success<Health> {
    Success::ok(Health {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}
