//! Database seeder for Escrowd development and testing.
//!
//! Seeds a demo user and two demo escrow transactions for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use escrowd_core::auth::hash_password;
use escrowd_core::escrow::{Currency, DealRole, TransactionStatus};
use escrowd_core::identity::Role;
use escrowd_db::entities::{transactions, users};

/// Demo user ID (consistent for all seeds)
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo user credential
const DEMO_PASSWORD: &str = "demo-password-123";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = escrowd_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo user...");
    seed_demo_user(&db).await;

    println!("Seeding demo transactions...");
    seed_demo_transactions(&db).await;

    println!("Seeding complete!");
}

fn demo_user_id() -> Uuid {
    Uuid::parse_str(DEMO_USER_ID).unwrap()
}

async fn seed_demo_user(db: &DatabaseConnection) {
    let existing = users::Entity::find_by_id(demo_user_id())
        .one(db)
        .await
        .expect("Failed to query users");
    if existing.is_some() {
        println!("  demo user already present, skipping");
        return;
    }

    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(demo_user_id()),
        name: Set("Demo User".to_string()),
        email: Set("demo@escrowd.dev".to_string()),
        password_hash: Set(hash_password(DEMO_PASSWORD).expect("Failed to hash password")),
        role: Set(Role::User.as_str().to_string()),
        avatar: Set(Some(
            "https://ui-avatars.com/api/?name=Demo+User&background=D4AF37&color=fff".to_string(),
        )),
        is_banned: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    user.insert(db).await.expect("Failed to insert demo user");
    println!("  demo user created (demo@escrowd.dev / {DEMO_PASSWORD})");
}

async fn seed_demo_transactions(db: &DatabaseConnection) {
    let count = transactions::Entity::find()
        .all(db)
        .await
        .expect("Failed to query transactions")
        .len();
    if count > 0 {
        println!("  transactions already present, skipping");
        return;
    }

    let fixtures = [
        (
            "Web Development Services",
            Decimal::from(1500),
            DealRole::Buyer,
            "DevStudio LLC",
            TransactionStatus::InProgress,
            2_i64,
            1_i64,
        ),
        (
            "Rolex Submariner Watch",
            Decimal::from(12500),
            DealRole::Seller,
            "WatchCollector99",
            TransactionStatus::Funded,
            5,
            4,
        ),
    ];

    for (title, amount, role, counterparty, status, created_days, updated_days) in fixtures {
        let tx = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            description: Set(None),
            amount: Set(amount),
            currency: Set(Currency::Usd.as_str().to_string()),
            role: Set(role.as_str().to_string()),
            counterparty: Set(counterparty.to_string()),
            status: Set(status.as_str().to_string()),
            created_by: Set(demo_user_id()),
            created_at: Set((Utc::now() - Duration::days(created_days)).into()),
            updated_at: Set((Utc::now() - Duration::days(updated_days)).into()),
        };
        tx.insert(db).await.expect("Failed to insert transaction");
        println!("  seeded '{title}'");
    }
}
