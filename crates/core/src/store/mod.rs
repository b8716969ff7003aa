//! Persistence contracts.
//!
//! The Identity Store and Transaction Store are opaque collaborators behind
//! these traits, so a real database and an in-memory fake satisfy the same
//! contract identically for testing.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::escrow::{Transaction, TransactionStatus};
use crate::identity::{NewUser, User};

pub use memory::{MemoryIdentityStore, MemoryTransactionStore};

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced record absent.
    #[error("record not found")]
    NotFound,

    /// Email already registered (case-insensitive).
    #[error("email already registered")]
    DuplicateEmail,

    /// Compare-and-set lost to a concurrent writer.
    #[error("concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Underlying persistence unavailable.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Store of user records.
///
/// Emails are unique case-insensitively; implementations lowercase them
/// before storage and lookup.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Finds a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a new user with role `user`.
    ///
    /// Fails with `StoreError::DuplicateEmail` if the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Returns every user, newest first.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;

    /// Sets the ban flag on a user.
    ///
    /// Fails with `StoreError::NotFound` for unknown ids.
    async fn set_banned(&self, id: Uuid, banned: bool) -> Result<User, StoreError>;
}

/// Store of escrow transaction records.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a transaction record.
    async fn insert(&self, tx: Transaction) -> Result<Transaction, StoreError>;

    /// Finds a transaction by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, StoreError>;

    /// Returns the owner's transactions ordered by `created_at` descending.
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>, StoreError>;

    /// Returns every transaction ordered by `created_at` descending.
    async fn list_all(&self) -> Result<Vec<Transaction>, StoreError>;

    /// Atomically updates a transaction's status.
    ///
    /// The write only applies while `updated_at` still equals
    /// `expected_updated_at`; a mismatch fails with
    /// `StoreError::ConcurrentModification` and leaves the record unchanged.
    async fn update_status(
        &self,
        id: Uuid,
        new_status: TransactionStatus,
        expected_updated_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Transaction, StoreError>;
}
