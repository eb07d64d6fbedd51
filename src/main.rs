//! DriveHub Server: multi-tenant hierarchical file storage
//!
//! Main entry point that wires all crates together, starts the sweep
//! scheduler, and runs until a shutdown signal arrives.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use drivehub_cache::CacheManager;
use drivehub_core::config::{AppConfig, LogFormat};
use drivehub_core::error::AppError;
use drivehub_core::traits::{BlobStorage, CacheProvider};
use drivehub_database::DatabasePool;
use drivehub_service::{QuotaTracker, Services};
use drivehub_storage::BlobStorageManager;
use drivehub_worker::{CronScheduler, Sweep};

#[tokio::main]
async fn main() {
    let env = std::env::var("DRIVEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Configuration loaded (env: {})", env);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DriveHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = DatabasePool::open(&config.database).await?;

    // ── Step 2: Initialize cache ─────────────────────────────────
    tracing::info!(
        "Initializing cache (provider: {})...",
        config.cache.provider
    );
    let cache = Arc::new(CacheManager::new(&config.cache).await?);
    if !cache.health_check().await.unwrap_or(false) {
        tracing::warn!("Cache health check failed; tree snapshots will be rebuilt on demand");
    }

    // ── Step 3: Initialize blob storage ──────────────────────────
    tracing::info!(
        "Initializing blob storage (provider: {})...",
        config.storage.provider
    );
    let storage = Arc::new(BlobStorageManager::new(&config.storage).await?);
    if !storage.health_check().await? {
        return Err(AppError::upstream(format!(
            "Blob storage '{}' is not reachable",
            storage.provider_type()
        )));
    }

    // ── Step 4: Initialize stores ────────────────────────────────
    let resources = db_pool.resource_store();
    let users = db_pool.user_store();

    // ── Step 5: Initialize services ──────────────────────────────
    let verifier = Arc::new(drivehub_auth::JwtDecoder::new(&config.auth));
    let services = Services::new(
        &config,
        Arc::clone(&resources),
        Arc::clone(&users),
        Arc::clone(&cache),
        Arc::clone(&storage),
        verifier,
    );
    tracing::info!(
        max_depth = config.tree.max_depth,
        tree_ttl_seconds = config.cache.tree_ttl_seconds,
        "Services initialized"
    );

    // ── Step 6: Start sweep scheduler ────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let quota = Arc::new(QuotaTracker::new(
            Arc::clone(&users),
            config.quota.clone(),
        ));
        let sweep = Arc::new(Sweep::new(
            Arc::clone(&resources),
            quota,
            Arc::clone(&storage),
        ));
        let scheduler = CronScheduler::new(sweep).await?;
        scheduler.register_sweep_tasks(&config.worker).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Sweep scheduler disabled");
        None
    };

    tracing::info!("DriveHub ready");

    // ── Step 7: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    drop(services);
    db_pool.close().await;

    tracing::info!("DriveHub shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
