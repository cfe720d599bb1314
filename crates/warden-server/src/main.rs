//! # Warden Server
//!
//! Loads configuration, selects the cache backend, wires the services and
//! runs until Ctrl+C or SIGTERM.

use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use warden_cache::{CacheBackend, CacheSelector, ConfiguredCache, MemoryCache};
use warden_config::{AppConfig, ConfigLoader};
use warden_core::WardenResult;
use warden_server::di::AppModule;
use warden_server::logging::{bootstrap_logging, init_logging};
use warden_server::startup::{print_banner, print_startup_info};

#[tokio::main]
async fn main() {
    let loader = {
        let _bootstrap = bootstrap_logging();
        match ConfigLoader::from_default_location() {
            Ok(loader) => loader,
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        }
    };

    let config = loader.get().await;
    init_logging(&config.observability);

    info!("Starting Warden...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(loader).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(loader: ConfigLoader) -> WardenResult<()> {
    let config = loader.get().await;
    let selector = Arc::new(CacheSelector::new());

    // A bad backend configuration stops start-up.
    let backend = selector.select(&config.cache).await?;
    if config.cache.uses_redis() {
        selector.redis(&config.cache).await?.ping().await?;
        info!("Redis reachable");
    }

    let sweeper = start_sweeper(&selector, &config).await;

    let module = AppModule::builder()
        .with_config(&config)
        .with_cache(Arc::new(ConfiguredCache::new(Arc::clone(&selector), loader)))
        .build();

    print_banner();
    print_startup_info(&config);
    info!(backend = backend.name(), via = module.cache().name(), "Services ready");

    shutdown_signal().await;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("Server shutdown complete");
    Ok(())
}

async fn start_sweeper(selector: &CacheSelector, config: &AppConfig) -> Option<JoinHandle<()>> {
    let interval = config.cache.sweep_interval()?;
    if config.cache.uses_redis() {
        warn!("cache.sweep_interval_secs is ignored with the Redis backend");
        return None;
    }
    info!("Sweeping expired cache entries every {:?}", interval);
    Some(MemoryCache::spawn_sweeper(selector.memory().await, interval))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
