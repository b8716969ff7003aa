//! Authentication routes for register, login, and profile lookup.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{deny_error, error_json, resolve_principal, store_error};
use escrowd_core::auth::{hash_password, verify_password};
use escrowd_core::identity::{NewUser, Role, User};
use escrowd_core::policy::Action;
use escrowd_core::store::IdentityStore;
use escrowd_shared::AppError;
use escrowd_shared::auth::{AuthResponse, LoginRequest, RegisterRequest, UserSummary};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Creates the auth routes that sit behind the auth middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// Builds the wire summary of a user. The credential never leaves the store.
pub(crate) fn summarize(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        avatar: user.avatar.clone(),
        is_banned: user.is_banned,
        created_at: user.created_at,
    }
}

fn bootstrap_summary(state: &AppState, email: &str) -> UserSummary {
    UserSummary {
        id: Uuid::nil(),
        name: state.admin_name.clone(),
        email: email.to_lowercase(),
        role: Role::Admin.as_str().to_string(),
        avatar: None,
        is_banned: false,
        created_at: Utc::now(),
    }
}

fn default_avatar(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=D4AF37&color=fff",
        name.replace(' ', "+")
    )
}

/// POST /auth/register - Create an account and log it in.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if name.is_empty() {
        return error_json(&AppError::Validation("Name is required".into()));
    }
    if email.is_empty() || !email.contains('@') {
        return error_json(&AppError::Validation("A valid email is required".into()));
    }
    if payload.password.is_empty() {
        return error_json(&AppError::Validation("Password is required".into()));
    }

    // The reserved admin email can never become a store record.
    if state.policy.bootstrap().matches_email(&email) {
        return error_json(&AppError::Conflict(
            "An account with this email already exists".into(),
        ));
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return error_json(&AppError::Internal(
                "An error occurred during registration".into(),
            ));
        }
    };

    let user = match state
        .identity
        .insert(NewUser {
            avatar: Some(default_avatar(&name)),
            name,
            email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(e) => return error_json(&store_error(e)),
    };

    let token = match state.jwt.issue(user.id, user.role.as_str(), &user.email) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to issue token");
            return error_json(&AppError::Internal(
                "An error occurred during registration".into(),
            ));
        }
    };

    info!(user_id = %user.id, email = %user.email, "New user registered");

    (
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            expires_in: state.jwt.token_expires_in(),
            user: summarize(&user),
        }),
    )
        .into_response()
}

/// POST /auth/login - Authenticate and return a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let email = payload.email.trim();

    // Bootstrap admin check runs before any store lookup.
    if state
        .policy
        .bootstrap()
        .matches_credentials(email, &payload.password)
    {
        let token = match state.jwt.issue(Uuid::nil(), Role::Admin.as_str(), email) {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "Failed to issue token");
                return error_json(&AppError::Internal("An error occurred during login".into()));
            }
        };

        info!("Bootstrap admin logged in");
        return (
            StatusCode::OK,
            Json(AuthResponse {
                token,
                expires_in: state.jwt.token_expires_in(),
                user: bootstrap_summary(&state, email),
            }),
        )
            .into_response();
    }

    let user = match state.identity.find_by_email(email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %email, "Login attempt for non-existent user");
            return error_json(&AppError::Unauthorized("Invalid email or password".into()));
        }
        Err(e) => return error_json(&store_error(e)),
    };

    if user.is_banned {
        info!(user_id = %user.id, "Login attempt for banned account");
        return error_json(&AppError::Forbidden("This account has been banned".into()));
    }

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return error_json(&AppError::Unauthorized("Invalid email or password".into()));
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return error_json(&AppError::Internal("An error occurred during login".into()));
        }
    }

    let token = match state.jwt.issue(user.id, user.role.as_str(), &user.email) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to issue token");
            return error_json(&AppError::Internal("An error occurred during login".into()));
        }
    };

    info!(user_id = %user.id, "User logged in successfully");

    (
        StatusCode::OK,
        Json(AuthResponse {
            token,
            expires_in: state.jwt.token_expires_in(),
            user: summarize(&user),
        }),
    )
        .into_response()
}

/// GET /auth/me - Return the caller's profile.
async fn me(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let principal = match resolve_principal(&state, &auth).await {
        Ok(p) => p,
        Err(response) => return response,
    };

    if let Err(reason) = state.policy.authorize(&principal, Action::ViewProfile) {
        return error_json(&deny_error(reason));
    }

    // The bootstrap admin has no store record to show.
    if state.policy.bootstrap().matches_email(&principal.email) {
        return (
            StatusCode::OK,
            Json(bootstrap_summary(&state, &principal.email)),
        )
            .into_response();
    }

    match state.identity.find_by_id(principal.id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(summarize(&user))).into_response(),
        Ok(None) => error_json(&AppError::NotFound("User not found".into())),
        Err(e) => error_json(&store_error(e)),
    }
}
