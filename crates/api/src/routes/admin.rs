//! Admin routes for user and transaction management.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::auth::summarize;
use crate::routes::transactions::TransactionResponse;
use crate::routes::{deny_error, error_json, escrow_error, resolve_principal, store_error};
use escrowd_core::escrow::TransactionStatus;
use escrowd_core::identity::Role;
use escrowd_core::policy::Action;
use escrowd_core::store::IdentityStore;
use escrowd_shared::AppError;
use escrowd_shared::auth::UserSummary;

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{user_id}/ban", put(toggle_ban))
        .route("/admin/transactions", get(list_transactions))
        .route(
            "/admin/transactions/{transaction_id}/status",
            put(set_status),
        )
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// Target status.
    pub status: String,
}

/// GET /admin/users - List every user.
async fn list_users(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let principal = match resolve_principal(&state, &auth).await {
        Ok(p) => p,
        Err(response) => return response,
    };

    if let Err(reason) = state.policy.authorize(&principal, Action::ListAllUsers) {
        return error_json(&deny_error(reason));
    }

    match state.identity.list_all().await {
        Ok(users) => {
            let items: Vec<UserSummary> = users.iter().map(summarize).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => error_json(&store_error(e)),
    }
}

/// PUT /admin/users/{user_id}/ban - Flip a user's ban flag.
async fn toggle_ban(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    let principal = match resolve_principal(&state, &auth).await {
        Ok(p) => p,
        Err(response) => return response,
    };

    if let Err(reason) = state.policy.authorize(&principal, Action::ToggleBan) {
        return error_json(&deny_error(reason));
    }

    let target = match state.identity.find_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return error_json(&AppError::NotFound("User not found".into())),
        Err(e) => return error_json(&store_error(e)),
    };

    // Admin accounts cannot be banned.
    if target.role == Role::Admin {
        return error_json(&AppError::BusinessRule(
            "Admin accounts cannot be banned".into(),
        ));
    }

    match state.identity.set_banned(user_id, !target.is_banned).await {
        Ok(user) => {
            info!(
                admin = %principal.id,
                user_id = %user.id,
                banned = user.is_banned,
                "Ban flag toggled"
            );
            (StatusCode::OK, Json(summarize(&user))).into_response()
        }
        Err(e) => error_json(&store_error(e)),
    }
}

/// GET /admin/transactions - List every transaction, newest first.
async fn list_transactions(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let principal = match resolve_principal(&state, &auth).await {
        Ok(p) => p,
        Err(response) => return response,
    };

    match state.engine.list_all(&principal).await {
        Ok(transactions) => {
            let items: Vec<TransactionResponse> =
                transactions.iter().map(TransactionResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => error_json(&escrow_error(e)),
    }
}

/// PUT /admin/transactions/{transaction_id}/status - Transition a transaction.
async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> impl IntoResponse {
    let principal = match resolve_principal(&state, &auth).await {
        Ok(p) => p,
        Err(response) => return response,
    };

    let Some(status) = TransactionStatus::parse(&payload.status) else {
        return error_json(&AppError::Validation("Unknown transaction status".into()));
    };

    match state
        .engine
        .set_status(&principal, transaction_id, status)
        .await
    {
        Ok(tx) => {
            info!(
                admin = %principal.id,
                transaction_id = %tx.id,
                status = %tx.status,
                "Transaction status updated"
            );
            (StatusCode::OK, Json(TransactionResponse::from(&tx))).into_response()
        }
        Err(e) => error_json(&escrow_error(e)),
    }
}
