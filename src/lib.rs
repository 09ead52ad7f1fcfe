//! API key manager.
//!
//! A REST API for issuing, editing, revoking and validating opaque `pk_`
//! bearer tokens, plus a key-gated GitHub repository summarizer.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage**: PostgreSQL with sqlx, or an in-memory store when no database is configured
//! - **Format**: JSON requests/responses

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the HTTP router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Routes that require an x-api-key header
    let key_gated_routes = Router::new()
        .route(
            "/api/github-summarizer",
            post(handlers::summarizer::summarize_repository),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Dashboard routes
        .route(
            "/api/api-keys",
            get(handlers::credentials::list_credentials)
                .post(handlers::credentials::create_credential),
        )
        .route(
            "/api/api-keys/stats",
            get(handlers::credentials::credential_stats),
        )
        .route(
            "/api/api-keys/{id}",
            get(handlers::credentials::get_credential)
                .put(handlers::credentials::update_credential)
                .delete(handlers::credentials::delete_credential),
        )
        // Playground routes
        .route(
            "/api/validate-api-key",
            post(handlers::validation::validate_api_key),
        )
        .route("/api/check-auth", get(handlers::validation::check_auth))
        .merge(key_gated_routes)
        .layer(TraceLayer::new_for_http())
        // The dashboard is served from a different origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
