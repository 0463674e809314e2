use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use schedgen::config::AppConfig;
use schedgen::server::create_router;
use schedgen::types::AppState;

/// How often expired catalog downloads are dropped from memory.
const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));

    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .init();

    if config.users.is_empty() {
        warn!("No API users configured; saving schedules is disabled");
    }

    let state = Arc::new(AppState::from_config(&config)?);

    let cache = Arc::clone(&state.catalog_cache);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            cache.cleanup_expired();
        }
    });

    let addr = format!("{}:{}", config.address, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        address = %addr,
        database = %config.database_path,
        users = state.tokens.len(),
        "Server listening"
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
