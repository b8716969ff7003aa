//! Escrow-specific error types.

use thiserror::Error;
use uuid::Uuid;

use crate::escrow::types::TransactionStatus;
use crate::policy::DenyReason;
use crate::store::StoreError;

/// Errors from lifecycle engine operations.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// Input rejected before any store write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Denied by the authorization policy.
    #[error("denied: {0}")]
    Denied(#[from] DenyReason),

    /// No transaction with this id.
    #[error("transaction not found: {0}")]
    NotFound(Uuid),

    /// The status transition is not in the lifecycle table.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },

    /// A concurrent writer won the compare-and-set.
    #[error("transaction was modified concurrently, please retry")]
    Conflict,

    /// The transaction store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EscrowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConcurrentModification => Self::Conflict,
            other => Self::Store(other),
        }
    }
}
