//! Escrowd API Server
//!
//! Main entry point for the Escrowd backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use escrowd_api::{AppState, create_router};
use escrowd_core::escrow::EscrowEngine;
use escrowd_core::policy::{AccessPolicy, BootstrapAdmin};
use escrowd_core::store::IdentityStore;
use escrowd_db::{TransactionRepository, UserRepository, connect};
use escrowd_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "escrowd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        token_expires_hours: (config.jwt.token_expiry_secs / 3600) as i64,
    };
    let jwt = Arc::new(JwtService::new(jwt_config));

    // Wire the stores, policy, and engine
    let identity: Arc<dyn IdentityStore> = Arc::new(UserRepository::new(db.clone()));
    let policy = Arc::new(AccessPolicy::new(
        identity.clone(),
        BootstrapAdmin {
            email: config.admin.email.clone(),
            secret: config.admin.secret.clone(),
        },
    ));
    let engine = Arc::new(EscrowEngine::new(
        Arc::new(TransactionRepository::new(db)),
        policy.clone(),
    ));

    // Create application state
    let state = AppState {
        identity,
        policy,
        engine,
        jwt,
        admin_name: config.admin.name.clone(),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
