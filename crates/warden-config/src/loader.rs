//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use warden_core::WardenError;

/// Environment variable prefix for overrides, e.g. `WARDEN_CACHE__REDIS__HOST`.
pub const ENV_PREFIX: &str = "WARDEN";

/// Configuration loader with runtime reload support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides, not committed
    /// 4. Environment variables with `WARDEN_` prefix
    ///
    /// The merged result is validated before it is accepted.
    pub fn new(config_dir: impl Into<PathBuf>) -> Result<Self, WardenError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, WardenError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    ///
    /// On failure the previous configuration stays in place.
    pub async fn reload(&self) -> Result<(), WardenError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &Path) -> Result<AppConfig, WardenError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(format!("{}_ENVIRONMENT", ENV_PREFIX)).unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = config_dir.join(format!("{}.toml", name));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize::<AppConfig>)
            .map_err(config_error_to_warden_error)?;

        if app_config.app.environment == "production" && app_config.security.jwt_secret == "change-me-in-production" {
            warn!("Using default JWT secret in production! This is a security risk.");
        }

        ConfigValidator::validate(&app_config)
            .map_err(|errors| WardenError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }

    /// Runs `f` against the current configuration under the read lock.
    ///
    /// Lets callers pick out one field without cloning the whole config.
    pub async fn read<R>(&self, f: impl FnOnce(&AppConfig) -> R) -> R {
        f(&*self.config.read().await)
    }
}

fn config_error_to_warden_error(err: ConfigError) -> WardenError {
    WardenError::Configuration(err.to_string())
}
