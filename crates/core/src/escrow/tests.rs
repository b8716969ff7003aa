//! Engine tests against the in-memory stores.

use std::sync::Arc;

use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::escrow::engine::EscrowEngine;
use crate::escrow::error::EscrowError;
use crate::escrow::types::{Currency, DealRole, NewTransaction, TransactionStatus};
use crate::identity::{NewUser, Role};
use crate::policy::{AccessPolicy, BootstrapAdmin, DenyReason, Principal};
use crate::store::{IdentityStore, MemoryIdentityStore, MemoryTransactionStore};

struct Fixture {
    identity: Arc<MemoryIdentityStore>,
    engine: EscrowEngine,
}

fn fixture() -> Fixture {
    let identity = Arc::new(MemoryIdentityStore::new());
    let policy = Arc::new(AccessPolicy::new(
        identity.clone(),
        BootstrapAdmin {
            email: "root@escrow.test".to_string(),
            secret: "super-secret".to_string(),
        },
    ));
    let engine = EscrowEngine::new(Arc::new(MemoryTransactionStore::new()), policy);
    Fixture { identity, engine }
}

async fn seed_principal(identity: &MemoryIdentityStore, email: &str) -> Principal {
    let user = identity
        .insert(NewUser {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            avatar: None,
        })
        .await
        .unwrap();
    Principal {
        id: user.id,
        role: user.role,
        email: user.email,
    }
}

fn admin_principal() -> Principal {
    Principal {
        id: Uuid::nil(),
        role: Role::Admin,
        email: "root@escrow.test".to_string(),
    }
}

fn deal(title: &str) -> NewTransaction {
    NewTransaction {
        title: title.to_string(),
        description: Some("a deal".to_string()),
        amount: dec!(100),
        currency: Currency::Usd,
        role: DealRole::Buyer,
        counterparty: "Bob".to_string(),
    }
}

#[tokio::test]
async fn test_create_assigns_pending_and_owner() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;

    let tx = f.engine.create(&alice, deal("Domain")).await.unwrap();

    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.created_by, alice.id);
    assert_eq!(tx.amount, dec!(100));
    assert_eq!(tx.currency, Currency::Usd);
    assert_eq!(tx.role, DealRole::Buyer);
    assert_eq!(tx.counterparty, "Bob");
    assert_eq!(tx.created_at, tx.updated_at);
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;

    let result = f.engine.create(&alice, deal("   ")).await;
    assert!(matches!(result, Err(EscrowError::Validation(_))));

    // Nothing was persisted.
    assert!(f.engine.list_owned(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_negative_amount() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;

    let mut input = deal("Domain");
    input.amount = dec!(-1);
    let result = f.engine.create(&alice, input).await;
    assert!(matches!(result, Err(EscrowError::Validation(_))));
}

#[tokio::test]
async fn test_round_trip_create_then_list_owned() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;

    let created = f.engine.create(&alice, deal("Domain")).await.unwrap();
    let owned = f.engine.list_owned(&alice).await.unwrap();

    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0], created);
}

#[tokio::test]
async fn test_list_owned_newest_first_and_scoped() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;
    let bob = seed_principal(&f.identity, "bob@x.com").await;

    let t1 = f.engine.create(&alice, deal("first")).await.unwrap();
    let t2 = f.engine.create(&alice, deal("second")).await.unwrap();
    let t3 = f.engine.create(&alice, deal("third")).await.unwrap();
    f.engine.create(&bob, deal("bobs")).await.unwrap();

    let owned = f.engine.list_owned(&alice).await.unwrap();
    assert_eq!(
        owned.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![t3.id, t2.id, t1.id]
    );
    assert!(owned.iter().all(|t| t.created_by == alice.id));
}

#[tokio::test]
async fn test_list_all_requires_admin() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;
    f.engine.create(&alice, deal("Domain")).await.unwrap();

    let denied = f.engine.list_all(&alice).await;
    assert!(matches!(
        denied,
        Err(EscrowError::Denied(DenyReason::ForbiddenRole))
    ));

    let all = f.engine.list_all(&admin_principal()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_get_hides_other_owners_transactions() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;
    let bob = seed_principal(&f.identity, "bob@x.com").await;

    let tx = f.engine.create(&alice, deal("Domain")).await.unwrap();

    let denied = f.engine.get(&bob, tx.id).await;
    assert!(matches!(
        denied,
        Err(EscrowError::Denied(DenyReason::NotOwner))
    ));

    assert_eq!(f.engine.get(&alice, tx.id).await.unwrap().id, tx.id);
    assert_eq!(
        f.engine.get(&admin_principal(), tx.id).await.unwrap().id,
        tx.id
    );
}

#[tokio::test]
async fn test_set_status_by_non_admin_denied_and_unchanged() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;
    let tx = f.engine.create(&alice, deal("Domain")).await.unwrap();

    let denied = f
        .engine
        .set_status(&alice, tx.id, TransactionStatus::Funded)
        .await;
    assert!(matches!(
        denied,
        Err(EscrowError::Denied(DenyReason::ForbiddenRole))
    ));

    let unchanged = f.engine.get(&alice, tx.id).await.unwrap();
    assert_eq!(unchanged.status, TransactionStatus::Pending);
    assert_eq!(unchanged.updated_at, tx.updated_at);
}

#[tokio::test]
async fn test_set_status_unknown_id_not_found() {
    let f = fixture();
    let result = f
        .engine
        .set_status(&admin_principal(), Uuid::new_v4(), TransactionStatus::Funded)
        .await;
    assert!(matches!(result, Err(EscrowError::NotFound(_))));
}

#[tokio::test]
async fn test_set_status_advances_updated_at_and_is_visible_to_owner() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;
    let tx = f.engine.create(&alice, deal("Domain")).await.unwrap();

    let updated = f
        .engine
        .set_status(&admin_principal(), tx.id, TransactionStatus::Funded)
        .await
        .unwrap();
    assert_eq!(updated.status, TransactionStatus::Funded);
    assert!(updated.updated_at > tx.updated_at);

    let owned = f.engine.list_owned(&alice).await.unwrap();
    assert_eq!(owned[0].status, TransactionStatus::Funded);
}

#[tokio::test]
async fn test_set_status_rejects_illegal_transition() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;
    let admin = admin_principal();
    let tx = f.engine.create(&alice, deal("Domain")).await.unwrap();

    // Skipping Funded is not allowed.
    let result = f
        .engine
        .set_status(&admin, tx.id, TransactionStatus::Completed)
        .await;
    assert!(matches!(
        result,
        Err(EscrowError::InvalidTransition { .. })
    ));

    // Terminal states stay terminal.
    f.engine
        .set_status(&admin, tx.id, TransactionStatus::Cancelled)
        .await
        .unwrap();
    let result = f
        .engine
        .set_status(&admin, tx.id, TransactionStatus::Pending)
        .await;
    assert!(matches!(
        result,
        Err(EscrowError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_full_lifecycle_happy_path() {
    let f = fixture();
    let alice = seed_principal(&f.identity, "alice@x.com").await;
    let admin = admin_principal();
    let tx = f.engine.create(&alice, deal("Domain")).await.unwrap();

    for status in [
        TransactionStatus::Funded,
        TransactionStatus::InProgress,
        TransactionStatus::Completed,
    ] {
        let updated = f.engine.set_status(&admin, tx.id, status).await.unwrap();
        assert_eq!(updated.status, status);
    }
}
