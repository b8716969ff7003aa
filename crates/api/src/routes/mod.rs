//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::middleware::auth::auth_middleware;
use crate::{AppState, middleware::AuthUser};
use escrowd_core::escrow::EscrowError;
use escrowd_core::policy::{DenyReason, Principal, ResolveError};
use escrowd_core::store::StoreError;
use escrowd_shared::AppError;

pub mod admin;
pub mod auth;
pub mod health;
pub mod transactions;

/// Creates the API router with public and protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(transactions::routes())
        .merge(admin::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Renders an `AppError` in the standard `{error, message}` shape.
pub(crate) fn error_json(e: &AppError) -> Response {
    if matches!(e, AppError::Database(_) | AppError::Internal(_)) {
        error!(error = %e, "Request failed");
    }
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": e.error_code(), "message": e.message() })),
    )
        .into_response()
}

/// Maps a policy denial into the error taxonomy.
///
/// `NotOwner` intentionally maps to `NotFound` so a denied caller cannot
/// probe which transaction ids exist.
pub(crate) fn deny_error(reason: DenyReason) -> AppError {
    match reason {
        DenyReason::Unauthenticated => AppError::Unauthorized("Authentication required".into()),
        DenyReason::Banned => AppError::Forbidden("This account has been banned".into()),
        DenyReason::ForbiddenRole => AppError::Forbidden("Admin access required".into()),
        DenyReason::NotOwner => AppError::NotFound("Transaction not found".into()),
    }
}

/// Maps a store failure into the error taxonomy.
pub(crate) fn store_error(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound => AppError::NotFound("Record not found".into()),
        StoreError::DuplicateEmail => {
            AppError::Conflict("An account with this email already exists".into())
        }
        StoreError::ConcurrentModification => {
            AppError::Conflict("Record was modified concurrently, please retry".into())
        }
        StoreError::Backend(err) => AppError::Database(err),
    }
}

/// Maps a lifecycle engine failure into the error taxonomy.
pub(crate) fn escrow_error(e: EscrowError) -> AppError {
    match e {
        EscrowError::Validation(msg) => AppError::Validation(msg),
        EscrowError::Denied(reason) => deny_error(reason),
        EscrowError::NotFound(_) => AppError::NotFound("Transaction not found".into()),
        EscrowError::InvalidTransition { from, to } => {
            AppError::BusinessRule(format!("Cannot move a transaction from {from} to {to}"))
        }
        EscrowError::Conflict => {
            AppError::Conflict("Transaction was modified concurrently, please retry".into())
        }
        EscrowError::Store(store) => store_error(store),
    }
}

/// Resolves the verified token claims to a live principal.
///
/// This is where ban state is re-read from the identity store, so a banned
/// user's still-valid token stops working immediately.
pub(crate) async fn resolve_principal(
    state: &AppState,
    auth: &AuthUser,
) -> Result<Principal, Response> {
    state
        .policy
        .resolve(auth.user_id(), auth.email())
        .await
        .map_err(|e| match e {
            ResolveError::Denied(reason) => error_json(&deny_error(reason)),
            ResolveError::Store(store) => error_json(&store_error(store)),
        })
}
