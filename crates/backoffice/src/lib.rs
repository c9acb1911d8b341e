//! Meridian Voyages back-office library.
//!
//! This crate provides the back-office API as a library, allowing it to
//! be tested end-to-end and reused by the CLI.
//!
//! # Security
//!
//! This crate holds privileged access:
//! - Generative-AI and WhatsApp provider credentials
//! - User account and role administration
//!
//! Only deploy behind the VPN; the listener binds to localhost by
//! default and relies on the platform for TLS.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ai;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;
pub mod whatsapp;

use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use state::AppState;

/// Builds the complete application router: health endpoints, the
/// rate-limited `/api` surface, and the `/files` download tree.
pub fn app(state: &AppState) -> Router {
    let api = routes::routes()
        .layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(api)
        .nest_service("/files", ServeDir::new(state.storage().root()))
        .with_state(state.clone())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Reports ready once every collection subscription has delivered its
/// first snapshot (or the readiness timeout elapsed).
async fn readiness(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::http::StatusCode {
    if state.sync().is_ready() {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}
