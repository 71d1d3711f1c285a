#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::routing::get;
use axum::Extension;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::router;
use crate::storage::setup;
use crate::storage::Storage;
use crate::utils::env_var_or_else;

mod api;
mod graceful_shutdown;
mod password;
mod sessions;
mod storage;
#[cfg(test)]
mod tests;
mod trips;
mod users;
mod utils;

const DEFAULT_RUST_LOG: &str = "travelease=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:5000";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://127.0.0.1:5500,http://localhost:5500";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let app = setup_app().await;

    let address = setup_address()?;
    tracing::info!("Listening on {}", address);

    let listener = TcpListener::bind(&address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
pub async fn setup_app() -> Router {
    let storage = setup().await;

    create_router(storage)
}

/// Create the router for TravelEase
fn create_router<S: Storage>(storage: S) -> Router {
    Router::new()
        .route("/", get(api::root))
        .nest("/api", router::<S>())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(Extension(storage))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;
    use tracing_subscriber::EnvFilter;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

/// CORS for the browser frontend
///
/// Cookie authentication needs credentials, which rules out a wildcard origin
fn cors_layer() -> CorsLayer {
    let origins = env_var_or_else("ALLOWED_ORIGINS", || String::from(DEFAULT_ALLOWED_ORIGINS));

    let origins = origins
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<HeaderValue>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
