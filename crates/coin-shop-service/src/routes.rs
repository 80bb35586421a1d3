//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, coins, health, info};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /api/auth` - Authenticate (registers on first use)
///
/// ## Bearer token auth
/// - `GET /api/info` - Balance, inventory and coin history
/// - `POST /api/sendCoin` - Send coins to another user
/// - `GET /api/buy/:item` - Buy one item
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;
    let max_concurrent_requests = state.config.max_concurrent_requests;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // One semaphore shared by every /api route; defaults to the pool size.
    let api_routes = Router::new()
        .route("/auth", post(auth::authenticate))
        .route("/info", get(info::get_info))
        .route("/sendCoin", post(coins::send_coin))
        .route("/buy/:item", get(coins::buy_item))
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
