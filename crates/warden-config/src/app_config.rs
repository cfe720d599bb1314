//! Application configuration structures.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// JWT/Security configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Outgoing notification configuration.
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "warden".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Cache configuration.
///
/// When `redis.host` is unset the process-local backend is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Default entry lifetime in seconds.
    pub expire_secs: u64,
    /// Interval of the expired-entry sweep for the in-process backend.
    /// Disabled when unset.
    pub sweep_interval_secs: Option<u64>,
    /// Networked backend settings.
    pub redis: RedisConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expire_secs: 300, // 5 minutes
            sweep_interval_secs: None,
            redis: RedisConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Returns the default entry lifetime as a Duration.
    #[must_use]
    pub const fn expire(&self) -> Duration {
        Duration::from_secs(self.expire_secs)
    }

    /// Returns the sweep interval, if the sweep is enabled.
    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs.map(Duration::from_secs)
    }

    /// Returns true if the networked backend should be used.
    #[must_use]
    pub fn uses_redis(&self) -> bool {
        self.redis.host.is_some()
    }
}

/// Redis configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis host; presence selects the networked backend.
    pub host: Option<String>,
    /// Redis port.
    pub port: u16,
    /// Logical database index.
    pub db: i64,
    /// Optional password.
    pub password: Option<String>,
    /// Maximum number of pooled connections.
    pub pool_size: usize,
    /// Timeout for obtaining or opening a connection, in seconds.
    pub connect_timeout_secs: u64,
    /// Timeout for a single command round trip, in seconds.
    pub read_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 6379,
            db: 0,
            password: None,
            pool_size: 5,
            connect_timeout_secs: 2,
            read_timeout_secs: 2,
        }
    }
}

impl RedisConfig {
    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the read timeout as a Duration.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Security configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// JWT secret key.
    pub jwt_secret: String,
    /// JWT access token expiration in seconds.
    pub jwt_access_expiration_secs: u64,
    /// JWT refresh token expiration in seconds.
    pub jwt_refresh_expiration_secs: u64,
    /// Password reset token expiration in seconds.
    pub reset_token_expiration_secs: u64,
    /// JWT issuer.
    pub jwt_issuer: String,
    /// JWT audience.
    pub jwt_audience: String,
    /// Password hashing memory cost in MiB (Argon2).
    pub password_hash_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_access_expiration_secs: 1800,    // 30 minutes
            jwt_refresh_expiration_secs: 604800, // 7 days
            reset_token_expiration_secs: 3600,   // 1 hour
            jwt_issuer: "warden".to_string(),
            jwt_audience: "warden-api".to_string(),
            password_hash_cost: 19,
        }
    }
}

impl SecurityConfig {
    /// Returns the access token expiration as a Duration.
    #[must_use]
    pub const fn access_token_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_access_expiration_secs)
    }

    /// Returns the refresh token expiration as a Duration.
    #[must_use]
    pub const fn refresh_token_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_refresh_expiration_secs)
    }

    /// Returns the reset token expiration as a Duration.
    #[must_use]
    pub const fn reset_token_expiration(&self) -> Duration {
        Duration::from_secs(self.reset_token_expiration_secs)
    }
}

/// Outgoing notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Sender address shown on password reset messages.
    pub email_from: String,
    /// Base URL of the reset page; the token is appended as a query parameter.
    pub reset_password_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_from: "no-reply@warden.local".to_string(),
            reset_password_url: "http://localhost:8000/auth/reset-password".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
