//! Integration tests for the transaction repository.
//!
//! These run against the database named by `DATABASE_URL` and are skipped
//! when the variable is unset.

use chrono::{Duration, Utc};
use escrowd_core::escrow::{Currency, DealRole, Transaction, TransactionStatus};
use escrowd_core::identity::NewUser;
use escrowd_core::store::{IdentityStore, StoreError, TransactionStore};
use escrowd_db::migration::Migrator;
use escrowd_db::{TransactionRepository, UserRepository};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

async fn connect() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    let db = escrowd_db::connect(&url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    Some(db)
}

async fn seed_owner(db: &DatabaseConnection) -> Uuid {
    let repo = UserRepository::new(db.clone());
    repo.insert(NewUser {
        name: "Owner".to_string(),
        email: format!("owner-{}@example.com", Uuid::new_v4()),
        password_hash: "$argon2id$test_hash".to_string(),
        avatar: None,
    })
    .await
    .expect("Failed to create owner")
    .id
}

fn deal(owner: Uuid, title: &str, age_hours: i64) -> Transaction {
    let at = Utc::now() - Duration::hours(age_hours);
    Transaction {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        amount: dec!(1500),
        currency: Currency::Usd,
        role: DealRole::Buyer,
        counterparty: "DevStudio LLC".to_string(),
        status: TransactionStatus::Pending,
        created_by: owner,
        created_at: at,
        updated_at: at,
    }
}

#[tokio::test]
async fn test_transaction_insert_round_trip() {
    let Some(db) = connect().await else { return };
    let owner = seed_owner(&db).await;
    let repo = TransactionRepository::new(db);

    let tx = deal(owner, "Web Development Services", 0);
    let inserted = repo.insert(tx.clone()).await.expect("Failed to insert");

    let found = repo
        .find_by_id(tx.id)
        .await
        .expect("Query failed")
        .expect("Transaction should exist");

    assert_eq!(found.id, inserted.id);
    assert_eq!(found.title, "Web Development Services");
    assert_eq!(found.amount, dec!(1500));
    assert_eq!(found.currency, Currency::Usd);
    assert_eq!(found.role, DealRole::Buyer);
    assert_eq!(found.status, TransactionStatus::Pending);
    assert_eq!(found.created_by, owner);
}

#[tokio::test]
async fn test_list_by_owner_ordering() {
    let Some(db) = connect().await else { return };
    let owner = seed_owner(&db).await;
    let repo = TransactionRepository::new(db);

    let t1 = deal(owner, "oldest", 3);
    let t2 = deal(owner, "middle", 2);
    let t3 = deal(owner, "newest", 1);
    for tx in [&t1, &t2, &t3] {
        repo.insert(tx.clone()).await.expect("Failed to insert");
    }

    let owned = repo.list_by_owner(owner).await.expect("Query failed");
    assert_eq!(
        owned.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![t3.id, t2.id, t1.id]
    );
}

#[tokio::test]
async fn test_list_by_owner_excludes_others() {
    let Some(db) = connect().await else { return };
    let alice = seed_owner(&db).await;
    let bob = seed_owner(&db).await;
    let repo = TransactionRepository::new(db);

    repo.insert(deal(alice, "alices", 0))
        .await
        .expect("Failed to insert");
    repo.insert(deal(bob, "bobs", 0))
        .await
        .expect("Failed to insert");

    let owned = repo.list_by_owner(alice).await.expect("Query failed");
    assert!(owned.iter().all(|t| t.created_by == alice));
}

#[tokio::test]
async fn test_update_status_compare_and_set() {
    let Some(db) = connect().await else { return };
    let owner = seed_owner(&db).await;
    let repo = TransactionRepository::new(db);

    let tx = deal(owner, "deal", 0);
    let inserted = repo.insert(tx).await.expect("Failed to insert");

    let updated = repo
        .update_status(
            inserted.id,
            TransactionStatus::Funded,
            inserted.updated_at,
            Utc::now(),
        )
        .await
        .expect("Update should succeed");
    assert_eq!(updated.status, TransactionStatus::Funded);
    assert!(updated.updated_at > inserted.updated_at);

    // A writer still holding the old stamp loses.
    let stale = repo
        .update_status(
            inserted.id,
            TransactionStatus::Cancelled,
            inserted.updated_at,
            Utc::now(),
        )
        .await;
    assert!(matches!(stale, Err(StoreError::ConcurrentModification)));
}

#[tokio::test]
async fn test_update_status_unknown_id() {
    let Some(db) = connect().await else { return };
    let repo = TransactionRepository::new(db);

    let result = repo
        .update_status(
            Uuid::new_v4(),
            TransactionStatus::Funded,
            Utc::now(),
            Utc::now(),
        )
        .await;
    assert!(matches!(result, Err(StoreError::NotFound)));
}
