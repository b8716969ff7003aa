//! Authorization decisions.
//!
//! Pure allow/deny logic over an explicit principal. The only live lookup is
//! ban state, which is read from the Identity Store on every resolution so a
//! still-valid token stops working the moment its user is banned.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::identity::Role;
use crate::store::{IdentityStore, StoreError};

/// An authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// User id. The bootstrap admin carries the nil UUID.
    pub id: Uuid,
    /// Role of the principal.
    pub role: Role,
    /// Email of the principal, lowercased.
    pub email: String,
}

impl Principal {
    /// Returns true if the principal holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Actions gated by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a transaction, becoming its owner.
    CreateTransaction,
    /// List the caller's own transactions.
    ListOwnTransactions,
    /// View a transaction owned by the given user.
    ViewTransaction {
        /// Owner of the target transaction.
        created_by: Uuid,
    },
    /// View the caller's own profile.
    ViewProfile,
    /// List every user (admin).
    ListAllUsers,
    /// Toggle a user's ban flag (admin).
    ToggleBan,
    /// List every transaction (admin).
    ListAllTransactions,
    /// Transition any transaction's status (admin).
    SetTransactionStatus,
}

/// Reasons a policy check denies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    /// No valid identity behind the request.
    #[error("unauthenticated")]
    Unauthenticated,
    /// The identity's account is banned.
    #[error("account is banned")]
    Banned,
    /// The identity's role does not permit the action.
    #[error("insufficient role")]
    ForbiddenRole,
    /// The identity does not own the target resource.
    #[error("not the owner")]
    NotOwner,
}

/// The reserved admin credential.
///
/// Authenticates directly to an admin principal with no Identity Store
/// record. Checked before any store lookup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    /// Reserved email.
    pub email: String,
    /// Reserved secret.
    pub secret: String,
}

impl BootstrapAdmin {
    /// Returns true if `email` names the bootstrap identity.
    #[must_use]
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }

    /// Returns true if the credential pair matches exactly.
    #[must_use]
    pub fn matches_credentials(&self, email: &str, secret: &str) -> bool {
        self.matches_email(email) && self.secret == secret
    }
}

/// Authorization policy: resolves token identities to principals and
/// decides allow/deny per action. No side effects.
pub struct AccessPolicy {
    identity: Arc<dyn IdentityStore>,
    bootstrap: BootstrapAdmin,
}

impl AccessPolicy {
    /// Creates a policy over the given identity store.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityStore>, bootstrap: BootstrapAdmin) -> Self {
        Self {
            identity,
            bootstrap,
        }
    }

    /// Returns the bootstrap identity.
    #[must_use]
    pub const fn bootstrap(&self) -> &BootstrapAdmin {
        &self.bootstrap
    }

    /// Resolves a verified token identity to a live principal.
    ///
    /// The bootstrap email short-circuits to an admin principal before any
    /// store lookup. Everyone else is read from the store so the ban flag is
    /// always current, whatever the token says.
    ///
    /// # Errors
    ///
    /// Returns `DenyReason::Unauthenticated` if the subject no longer exists,
    /// `DenyReason::Banned` if the account is banned.
    pub async fn resolve(&self, subject: Uuid, email: &str) -> Result<Principal, ResolveError> {
        if self.bootstrap.matches_email(email) {
            return Ok(Principal {
                id: subject,
                role: Role::Admin,
                email: email.to_lowercase(),
            });
        }

        let user = self
            .identity
            .find_by_id(subject)
            .await?
            .ok_or(ResolveError::Denied(DenyReason::Unauthenticated))?;

        if user.is_banned {
            return Err(ResolveError::Denied(DenyReason::Banned));
        }

        Ok(Principal {
            id: user.id,
            role: user.role,
            email: user.email,
        })
    }

    /// Decides whether the principal may perform the action.
    ///
    /// # Errors
    ///
    /// Returns the applicable `DenyReason` when the action is not allowed.
    pub fn authorize(&self, principal: &Principal, action: Action) -> Result<(), DenyReason> {
        match action {
            Action::CreateTransaction | Action::ListOwnTransactions | Action::ViewProfile => Ok(()),
            Action::ViewTransaction { created_by } => {
                if principal.is_admin() || principal.id == created_by {
                    Ok(())
                } else {
                    Err(DenyReason::NotOwner)
                }
            }
            Action::ListAllUsers
            | Action::ToggleBan
            | Action::ListAllTransactions
            | Action::SetTransactionStatus => {
                if principal.is_admin() {
                    Ok(())
                } else {
                    Err(DenyReason::ForbiddenRole)
                }
            }
        }
    }
}

impl std::fmt::Debug for AccessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessPolicy")
            .field("bootstrap_email", &self.bootstrap.email)
            .finish_non_exhaustive()
    }
}

/// Errors from principal resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Denied by policy.
    #[error(transparent)]
    Denied(#[from] DenyReason),
    /// The identity store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
