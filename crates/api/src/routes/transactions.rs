//! Transaction routes for authenticated users.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{error_json, escrow_error, resolve_principal};
use escrowd_core::escrow::{Currency, DealRole, NewTransaction, Transaction};
use escrowd_shared::AppError;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions", get(list_transactions))
        .route("/transactions/{transaction_id}", get(get_transaction))
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Deal title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Escrowed amount.
    pub amount: Decimal,
    /// Settlement currency code.
    pub currency: String,
    /// The caller's role in the deal.
    pub role: String,
    /// The other party.
    pub counterparty: String,
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Deal title.
    pub title: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Escrowed amount.
    pub amount: String,
    /// Settlement currency code.
    pub currency: String,
    /// The creator's role in the deal.
    pub role: String,
    /// The other party.
    pub counterparty: String,
    /// Lifecycle status.
    pub status: String,
    /// Owning user ID.
    pub created_by: Uuid,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            title: tx.title.clone(),
            description: tx.description.clone(),
            amount: tx.amount.to_string(),
            currency: tx.currency.as_str().to_string(),
            role: tx.role.as_str().to_string(),
            counterparty: tx.counterparty.clone(),
            status: tx.status.as_str().to_string(),
            created_by: tx.created_by,
            created_at: tx.created_at.to_rfc3339(),
            updated_at: tx.updated_at.to_rfc3339(),
        }
    }
}

/// POST /transactions - Create a new escrow transaction.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    let principal = match resolve_principal(&state, &auth).await {
        Ok(p) => p,
        Err(response) => return response,
    };

    let Some(currency) = Currency::parse(&payload.currency) else {
        return error_json(&AppError::Validation(
            "Currency must be one of USD, EUR, GBP, BTC".into(),
        ));
    };

    let Some(role) = DealRole::parse(&payload.role) else {
        return error_json(&AppError::Validation(
            "Role must be one of Buyer, Seller, Broker".into(),
        ));
    };

    let input = NewTransaction {
        title: payload.title,
        description: payload.description,
        amount: payload.amount,
        currency,
        role,
        counterparty: payload.counterparty,
    };

    match state.engine.create(&principal, input).await {
        Ok(tx) => {
            info!(transaction_id = %tx.id, user_id = %principal.id, "Transaction created");
            (StatusCode::CREATED, Json(TransactionResponse::from(&tx))).into_response()
        }
        Err(e) => error_json(&escrow_error(e)),
    }
}

/// GET /transactions - List the caller's own transactions, newest first.
async fn list_transactions(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let principal = match resolve_principal(&state, &auth).await {
        Ok(p) => p,
        Err(response) => return response,
    };

    match state.engine.list_owned(&principal).await {
        Ok(transactions) => {
            let items: Vec<TransactionResponse> =
                transactions.iter().map(TransactionResponse::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => error_json(&escrow_error(e)),
    }
}

/// GET /transactions/{transaction_id} - Fetch one transaction the caller may see.
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse {
    let principal = match resolve_principal(&state, &auth).await {
        Ok(p) => p,
        Err(response) => return response,
    };

    match state.engine.get(&principal, transaction_id).await {
        Ok(tx) => (StatusCode::OK, Json(TransactionResponse::from(&tx))).into_response(),
        Err(e) => error_json(&escrow_error(e)),
    }
}
