//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Request extractors
//! - Response types

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use escrowd_core::escrow::EscrowEngine;
use escrowd_core::policy::AccessPolicy;
use escrowd_core::store::IdentityStore;
use escrowd_shared::JwtService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity store for user records.
    pub identity: Arc<dyn IdentityStore>,
    /// Authorization policy.
    pub policy: Arc<AccessPolicy>,
    /// Lifecycle engine over the transaction store.
    pub engine: Arc<EscrowEngine>,
    /// JWT service for token operations.
    pub jwt: Arc<JwtService>,
    /// Display name for the bootstrap admin in auth responses.
    pub admin_name: String,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
