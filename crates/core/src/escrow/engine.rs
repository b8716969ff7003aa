//! Lifecycle engine: validates and applies transaction operations.
//!
//! Every operation takes the acting principal explicitly and consults the
//! authorization policy before touching the store, so a denied caller learns
//! nothing about whether the target exists.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::escrow::error::EscrowError;
use crate::escrow::types::{NewTransaction, Transaction, TransactionStatus};
use crate::policy::{AccessPolicy, Action, Principal};
use crate::store::{StoreError, TransactionStore};

/// Validates and applies escrow transaction operations.
pub struct EscrowEngine {
    store: Arc<dyn TransactionStore>,
    policy: Arc<AccessPolicy>,
}

impl EscrowEngine {
    /// Creates an engine over the given store and policy.
    #[must_use]
    pub fn new(store: Arc<dyn TransactionStore>, policy: Arc<AccessPolicy>) -> Self {
        Self { store, policy }
    }

    /// Creates a transaction owned by the principal.
    ///
    /// Assigns `id`, sets `status = Pending` and `created_at = updated_at`.
    /// Invalid input is rejected synchronously; nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns `EscrowError::Validation` for bad input, `EscrowError::Denied`
    /// if the policy refuses, `EscrowError::Store` on persistence failure.
    pub async fn create(
        &self,
        principal: &Principal,
        input: NewTransaction,
    ) -> Result<Transaction, EscrowError> {
        self.policy
            .authorize(principal, Action::CreateTransaction)?;
        validate(&input)?;

        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input.description,
            amount: input.amount,
            currency: input.currency,
            role: input.role,
            counterparty: input.counterparty,
            status: TransactionStatus::Pending,
            created_by: principal.id,
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert(tx).await?)
    }

    /// Returns the principal's own transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `EscrowError::Denied` if the policy refuses,
    /// `EscrowError::Store` on persistence failure.
    pub async fn list_owned(&self, principal: &Principal) -> Result<Vec<Transaction>, EscrowError> {
        self.policy
            .authorize(principal, Action::ListOwnTransactions)?;
        Ok(self.store.list_by_owner(principal.id).await?)
    }

    /// Returns every transaction, newest first. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `EscrowError::Denied` for non-admin callers,
    /// `EscrowError::Store` on persistence failure.
    pub async fn list_all(&self, principal: &Principal) -> Result<Vec<Transaction>, EscrowError> {
        self.policy
            .authorize(principal, Action::ListAllTransactions)?;
        Ok(self.store.list_all().await?)
    }

    /// Returns a single transaction visible to the principal.
    ///
    /// # Errors
    ///
    /// Returns `EscrowError::NotFound` for unknown ids, `EscrowError::Denied`
    /// with `NotOwner` when a non-admin caller is not the owner.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<Transaction, EscrowError> {
        let tx = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(EscrowError::NotFound(id))?;

        self.policy.authorize(
            principal,
            Action::ViewTransaction {
                created_by: tx.created_by,
            },
        )?;
        Ok(tx)
    }

    /// Transitions a transaction's status. Admin only.
    ///
    /// The policy is consulted before the record is fetched. The write goes
    /// through the store's compare-and-set keyed on `updated_at`, so of two
    /// concurrent admins exactly one wins and the other gets a conflict.
    ///
    /// # Errors
    ///
    /// Returns `EscrowError::Denied` for non-admin callers without touching
    /// the store, `EscrowError::NotFound` for unknown ids,
    /// `EscrowError::InvalidTransition` when the lifecycle table forbids the
    /// move, `EscrowError::Conflict` when a concurrent writer won.
    pub async fn set_status(
        &self,
        principal: &Principal,
        id: Uuid,
        new_status: TransactionStatus,
    ) -> Result<Transaction, EscrowError> {
        self.policy
            .authorize(principal, Action::SetTransactionStatus)?;

        let tx = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(EscrowError::NotFound(id))?;

        if !tx.status.can_transition_to(new_status) {
            return Err(EscrowError::InvalidTransition {
                from: tx.status,
                to: new_status,
            });
        }

        self.store
            .update_status(id, new_status, tx.updated_at, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => EscrowError::NotFound(id),
                other => other.into(),
            })
    }
}

impl std::fmt::Debug for EscrowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowEngine").finish_non_exhaustive()
    }
}

fn validate(input: &NewTransaction) -> Result<(), EscrowError> {
    if input.title.trim().is_empty() {
        return Err(EscrowError::Validation("title must not be empty".into()));
    }
    if input.amount < Decimal::ZERO {
        return Err(EscrowError::Validation(
            "amount must be non-negative".into(),
        ));
    }
    if input.counterparty.trim().is_empty() {
        return Err(EscrowError::Validation(
            "counterparty must not be empty".into(),
        ));
    }
    Ok(())
}
