//! Tracing subscriber set-up.

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warden_config::ObservabilityConfig;

/// Directive used when `RUST_LOG` is unset.
#[must_use]
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!("{},warden=debug", config.log_level.to_lowercase())
}

/// Returns true if `config` asks for JSON output.
#[must_use]
pub fn wants_json(config: &ObservabilityConfig) -> bool {
    config.log_format.eq_ignore_ascii_case("json")
}

/// Installs a subscriber for the current thread until the guard drops.
///
/// Covers start-up, before the configuration that picks the global
/// subscriber has been read. Uses the default level and writes to stderr.
#[must_use]
pub fn bootstrap_logging() -> DefaultGuard {
    let config = ObservabilityConfig::default();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(&config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .set_default()
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is a no-op.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(config)));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if wants_json(config) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!("Logging already initialized: {}", e);
    }
}
