mod cleanup;
mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pinvault_api::app_router;
use pinvault_api::auth::AppStateInner;
use pinvault_db::{Database, UserRepository};
use pinvault_market::MarketplaceClient;

use crate::config::Config;

/// Revoked tokens are pruned hourly.
const CLEANUP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinvault=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;
    if config.seed {
        let seeded = db.seed_if_empty()?;
        if seeded == 0 {
            info!("Catalog already populated, skipping seed");
        }
    }
    if let Some(name) = config.admin_username.as_deref() {
        if db.set_admin(name, true)? {
            info!("Granted admin rights to {}", name);
        } else {
            warn!("Admin user {} does not exist yet; register it and restart", name);
        }
    }

    if !config.market.has_credentials() {
        warn!("EBAY_APP_ID / EBAY_CERT_ID not set; marketplace lookups will return no data");
    }
    info!("Marketplace API at {}", config.market.api_base);
    let market = Arc::new(MarketplaceClient::from_config(config.market.clone())?);

    let state = AppStateInner::new(db, market, config.jwt_secret.clone());

    tokio::spawn(cleanup::run_cleanup_loop(state.clone(), CLEANUP_INTERVAL_SECS));

    let app = app_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("PinVault server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
