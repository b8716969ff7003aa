//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account; owns and sees only its own transactions.
    User,
    /// Full visibility over users and transactions.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user record.
///
/// `id`, `created_at`, and `created_by` relationships are immutable after
/// creation. Accounts are never hard-deleted; `is_banned` is the soft-disable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email, unique case-insensitively, stored lowercased.
    pub email: String,
    /// Argon2id PHC hash of the credential. Never serialized.
    pub password_hash: String,
    /// Role of the account.
    pub role: Role,
    /// Optional avatar URL.
    pub avatar: Option<String>,
    /// When true, login is refused and every policy check denies.
    pub is_banned: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email; the store lowercases it before persisting.
    pub email: String,
    /// Argon2id PHC hash of the credential.
    pub password_hash: String,
    /// Optional avatar URL.
    pub avatar: Option<String>,
}
