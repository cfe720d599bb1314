//! Server startup utilities.

use tracing::info;
use warden_config::AppConfig;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
 _      __             __
| | /| / /__ ________  / /__ ___
| |/ |/ / _ `/ __/ _ \/ / -_) _ \
|__/|__/\_,_/_/  \_,_/_/\__/_//_/
    "#);
}

/// Describes the cache backend `config` selects.
#[must_use]
pub fn backend_summary(config: &AppConfig) -> String {
    let cache = &config.cache;
    match cache.redis.host.as_deref() {
        Some(host) => format!(
            "redis://{}:{}/{} (pool {})",
            host, cache.redis.port, cache.redis.db, cache.redis.pool_size
        ),
        None => match cache.sweep_interval_secs {
            Some(secs) => format!("in-process (sweep every {}s)", secs),
            None => "in-process".to_string(),
        },
    }
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Application: {} v{}", config.app.name, config.app.version);
    info!("Environment: {}", config.app.environment);
    info!("Cache:       {}", backend_summary(config));
    info!("Entry TTL:   {}s", config.cache.expire_secs);
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info(&AppConfig::default());
    }

    #[test]
    fn test_backend_summary() {
        let mut config = AppConfig::default();
        assert_eq!(backend_summary(&config), "in-process");

        config.cache.sweep_interval_secs = Some(30);
        assert_eq!(backend_summary(&config), "in-process (sweep every 30s)");

        config.cache.redis.host = Some("cache".to_string());
        config.cache.redis.db = 2;
        assert_eq!(backend_summary(&config), "redis://cache:6379/2 (pool 5)");
    }
}
