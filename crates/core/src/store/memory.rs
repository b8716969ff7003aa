//! In-memory store implementations.
//!
//! Functionally equivalent to the database-backed stores; used by unit and
//! endpoint tests and usable for local development without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::escrow::{Transaction, TransactionStatus};
use crate::identity::{NewUser, Role, User};
use crate::store::{IdentityStore, StoreError, TransactionStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-memory identity store.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryIdentityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_lowercase();
        Ok(lock(&self.users)
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let email = user.email.to_lowercase();
        let mut users = lock(&self.users);

        if users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email,
            password_hash: user.password_hash,
            role: Role::User,
            avatar: user.avatar,
            is_banned: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let mut all: Vec<User> = lock(&self.users).values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn set_banned(&self, id: Uuid, banned: bool) -> Result<User, StoreError> {
        let mut users = lock(&self.users);
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.is_banned = banned;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

/// In-memory transaction store.
#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    transactions: Mutex<HashMap<Uuid, Transaction>>,
}

impl MemoryTransactionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn insert(&self, tx: Transaction) -> Result<Transaction, StoreError> {
        lock(&self.transactions).insert(tx.id, tx.clone());
        Ok(tx)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, StoreError> {
        Ok(lock(&self.transactions).get(&id).cloned())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Transaction>, StoreError> {
        let mut owned: Vec<Transaction> = lock(&self.transactions)
            .values()
            .filter(|t| t.created_by == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn list_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let mut all: Vec<Transaction> = lock(&self.transactions).values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_status(
        &self,
        id: Uuid,
        new_status: TransactionStatus,
        expected_updated_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Transaction, StoreError> {
        let mut transactions = lock(&self.transactions);
        let tx = transactions.get_mut(&id).ok_or(StoreError::NotFound)?;

        if tx.updated_at != expected_updated_at {
            return Err(StoreError::ConcurrentModification);
        }

        tx.status = new_status;
        tx.updated_at = now;
        Ok(tx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use crate::escrow::{Currency, DealRole};

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            avatar: None,
        }
    }

    fn new_tx(owner: Uuid, title: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            amount: dec!(100),
            currency: Currency::Usd,
            role: DealRole::Buyer,
            counterparty: "Counterparty".to_string(),
            status: TransactionStatus::Pending,
            created_by: owner,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_case_insensitive() {
        let store = MemoryIdentityStore::new();
        store.insert(new_user("Alice", "alice@x.com")).await.unwrap();

        let result = store.insert(new_user("Alice Again", "ALICE@X.COM")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_find_by_email_normalizes_case() {
        let store = MemoryIdentityStore::new();
        let created = store.insert(new_user("Alice", "Alice@X.com")).await.unwrap();
        assert_eq!(created.email, "alice@x.com");

        let found = store.find_by_email("aLiCe@x.CoM").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_set_banned_unknown_id() {
        let store = MemoryIdentityStore::new();
        let result = store.set_banned(Uuid::new_v4(), true).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_by_owner_filters_and_orders() {
        let store = MemoryTransactionStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut t1 = new_tx(alice, "first");
        let mut t2 = new_tx(alice, "second");
        let t3 = new_tx(bob, "other");
        t1.created_at = Utc::now() - chrono::Duration::hours(2);
        t2.created_at = Utc::now() - chrono::Duration::hours(1);

        store.insert(t1.clone()).await.unwrap();
        store.insert(t2.clone()).await.unwrap();
        store.insert(t3).await.unwrap();

        let owned = store.list_by_owner(alice).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].id, t2.id);
        assert_eq!(owned[1].id, t1.id);
        assert!(owned.iter().all(|t| t.created_by == alice));
    }

    #[tokio::test]
    async fn test_update_status_compare_and_set() {
        let store = MemoryTransactionStore::new();
        let tx = new_tx(Uuid::new_v4(), "deal");
        store.insert(tx.clone()).await.unwrap();

        let updated = store
            .update_status(tx.id, TransactionStatus::Funded, tx.updated_at, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.status, TransactionStatus::Funded);
        assert!(updated.updated_at >= tx.updated_at);

        // Second writer still holding the old stamp loses.
        let stale = store
            .update_status(tx.id, TransactionStatus::Cancelled, tx.updated_at, Utc::now())
            .await;
        assert!(matches!(stale, Err(StoreError::ConcurrentModification)));

        let current = store.find_by_id(tx.id).await.unwrap().unwrap();
        assert_eq!(current.status, TransactionStatus::Funded);
    }
}
