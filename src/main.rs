//! Topicflow Workflow Gateway
//!
//! Decision gateway for the academic topic submission workflow: duplicate-check
//! interpretation, reviewer-selection capacity constraints and submission
//! gating, in front of the upstream topic/AI backend.

mod api;
mod auth;
mod config;
mod engine;
mod errors;
mod models;
mod session;
mod upstream;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use session::SessionStore;
use upstream::UpstreamClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub upstream: Arc<UpstreamClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Topicflow Workflow Gateway");
    tracing::info!("Upstream backend: {}", config.upstream_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (TOPICFLOW_API_PSK). Authentication is disabled!");
    }

    let upstream = Arc::new(UpstreamClient::new(&config)?);
    let sessions = Arc::new(SessionStore::new());

    // Create application state
    let state = AppState {
        sessions,
        upstream,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Draft workflow
        .route("/drafts", post(api::create_draft))
        .route("/drafts/{id}", get(api::get_draft))
        .route("/drafts/{id}", delete(api::discard_draft))
        .route("/drafts/{id}/check", post(api::run_duplicate_check))
        .route("/drafts/{id}/suggestion", post(api::apply_suggestion))
        .route("/drafts/{id}/confirm", post(api::confirm_draft))
        // Reviewer selection
        .route("/selections", post(api::create_selection))
        .route("/selections/{id}", get(api::get_selection))
        .route("/selections/{id}", delete(api::discard_selection))
        .route("/selections/{id}/candidates", get(api::list_candidates))
        .route("/selections/{id}/toggle", post(api::toggle_reviewer))
        .route("/selections/{id}/confirm", post(api::confirm_selection))
        // Topic gate
        .route("/topics/{id}/gate", get(api::topic_gate))
        .route("/topics/{id}/submit", post(api::submit_topic))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
