//! Meridian Voyages Back-Office - internal administration API.
//!
//! This binary serves the back-office API on port 3001.
//!
//! # Security
//!
//! **This binary must ONLY run on VPN-protected infrastructure.**
//!
//! - Accessible only via the company VPN
//! - Holds generative-AI and WhatsApp provider credentials
//! - Administers user accounts, roles, and permissions
//!
//! # Architecture
//!
//! - Axum web framework serving a JSON API for the agency SPA
//! - In-process document store with push-based collection snapshots
//! - Anthropic Messages API for itinerary planning and chat
//! - OpenAI Images API for cover-image generation
//! - Meta Graph API for WhatsApp broadcasts

#![cfg_attr(not(test), forbid(unsafe_code))]

use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meridian_backoffice::config::BackofficeConfig;
use meridian_backoffice::state::AppState;
use meridian_backoffice::{app, seed};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &BackofficeConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = BackofficeConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "meridian_backoffice=info,tower_http=debug".into());

    // Use JSON format on the PaaS for structured log parsing, text locally
    let is_paas = std::env::var("FLY_APP_NAME").is_ok();
    let json_layer = is_paas.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_paas).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Build application state (store, sync subscriptions, provider clients)
    let state = AppState::new(config.clone()).expect("Failed to create application state");

    // System roles are seeded on every start; existing ones are untouched.
    seed::seed_system_roles(state.store());

    // Bootstrap the primary admin account when missing.
    match seed::ensure_primary_admin(
        state.auth(),
        state.store(),
        &config.primary_admin_email,
        config.primary_admin_password.as_ref(),
    ) {
        Ok(Some(generated)) => tracing::warn!(
            email = %config.primary_admin_email,
            password = %generated,
            "primary admin bootstrapped with a generated password; record it now and rotate after first sign-in"
        ),
        Ok(None) => {}
        Err(e) => tracing::error!(error = %e, "failed to bootstrap primary admin"),
    }

    // Build router
    let app = app(&state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    // NOTE: Binding to 127.0.0.1 - the VPN handles external access
    let addr = state.config().socket_addr();
    tracing::info!("back-office listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
