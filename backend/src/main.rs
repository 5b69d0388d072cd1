//! Main entry point for the tokengate backend.
//!
//! This file initializes logging, loads configuration, connects the
//! credential database and the session store, and serves the Axum router
//! until Ctrl-C, after which the connections are released.

use std::sync::Arc;
use tokengate::api::app_router;
use tokengate::auth::service::AuthService;
use tokengate::config::{Config, SessionStoreKind};
use tokengate::database::Database;
use tokengate::repositories::session_store::{
    MemorySessionStore, RedisSessionStore, SessionStore,
};
use tokengate::repositories::user_repository::SqliteUserRepository;
use tracing::{info, warn};
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    db.migrate().await?;

    let store: Arc<dyn SessionStore> = match config.session_store {
        SessionStoreKind::Redis => Arc::new(RedisSessionStore::connect(&config.redis_url).await?),
        SessionStoreKind::Memory => {
            warn!("Using the in-process session store; sessions will not survive a restart");
            Arc::new(MemorySessionStore::new())
        }
    };
    let repo = Arc::new(SqliteUserRepository::new(db.pool().clone()));
    let auth = Arc::new(AuthService::from_config(&config, repo, store)?);

    let app = app_router(auth);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting tokengate server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("tokengate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
