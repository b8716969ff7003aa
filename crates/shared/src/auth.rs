//! Authentication types for JWT claims and auth payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID). The bootstrap admin uses the nil UUID.
    pub sub: Uuid,
    /// User's role at issuance time.
    pub role: String,
    /// User's email at issuance time.
    pub email: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, role: &str, email: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Token plus user summary, returned by both register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
    /// Authenticated user info.
    pub user: UserSummary,
}

/// User info returned in responses. Never carries the credential.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// User email.
    pub email: String,
    /// User's role.
    pub role: String,
    /// Optional avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Whether the account is banned.
    pub is_banned: bool,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}
