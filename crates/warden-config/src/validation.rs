//! Configuration validation module.
//!
//! Collects every problem in one pass so start-up can report them together
//! instead of failing on the first one.

use crate::AppConfig;
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// JWT secret is too short (minimum 32 characters).
    JwtSecretTooShort { actual: usize, minimum: usize },
    /// Pool size is zero.
    EmptyPool,
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: usize, maximum: usize },
    /// Redis host was set but is blank.
    BlankRedisHost,
    /// Redis database index is negative.
    NegativeRedisDb { value: i64 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout or lifetime value must be positive.
    NonPositiveTimeout { name: String, value: u64 },
    /// Password hash cost is invalid.
    InvalidHashCost { value: u32, minimum: u32, maximum: u32 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JwtSecretTooShort { actual, minimum } => {
                write!(f, "JWT secret too short: {} characters (minimum {})", actual, minimum)
            }
            Self::EmptyPool => write!(f, "Redis pool size must be at least 1"),
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::BlankRedisHost => write!(f, "Redis host is set but empty"),
            Self::NegativeRedisDb { value } => {
                write!(f, "Redis database index must not be negative, got {}", value)
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{}' must be positive, got {}", name, value)
            }
            Self::InvalidHashCost { value, minimum, maximum } => {
                write!(
                    f,
                    "Invalid password hash cost: {} (must be between {} and {})",
                    value, minimum, maximum
                )
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{}' (valid: pretty, json)", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Minimum JWT secret length.
    const MIN_JWT_SECRET_LENGTH: usize = 32;
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: usize = 1000;
    /// Minimum Argon2 memory cost in MiB.
    const MIN_HASH_COST: u32 = 1;
    /// Maximum Argon2 memory cost in MiB.
    const MAX_HASH_COST: u32 = 1024;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    /// Valid log formats.
    const VALID_LOG_FORMATS: &'static [&'static str] = &["pretty", "json"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_cache(&config.cache, &mut errors);
        Self::validate_security(&config.security, &mut errors);
        Self::validate_notification(&config.notification, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_cache(config: &crate::CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.expire_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.expire_secs".to_string(),
                value: 0,
            });
        }
        if config.sweep_interval_secs == Some(0) {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.sweep_interval_secs".to_string(),
                value: 0,
            });
        }

        // Pool settings only matter once a host selects the networked backend.
        let redis = &config.redis;
        let Some(host) = redis.host.as_deref() else {
            return;
        };

        if host.trim().is_empty() {
            errors.push(ConfigValidationError::BlankRedisHost);
        } else if let Err(e) = Url::parse(&format!("redis://{}:{}", host, redis.port)) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: e.to_string(),
            });
        }

        if redis.db < 0 {
            errors.push(ConfigValidationError::NegativeRedisDb { value: redis.db });
        }
        if redis.pool_size == 0 {
            errors.push(ConfigValidationError::EmptyPool);
        }
        if redis.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: redis.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
        if redis.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.redis.connect_timeout_secs".to_string(),
                value: 0,
            });
        }
        if redis.read_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.redis.read_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_security(config: &crate::SecurityConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.jwt_secret.len() < Self::MIN_JWT_SECRET_LENGTH {
            errors.push(ConfigValidationError::JwtSecretTooShort {
                actual: config.jwt_secret.len(),
                minimum: Self::MIN_JWT_SECRET_LENGTH,
            });
        }

        if !(Self::MIN_HASH_COST..=Self::MAX_HASH_COST).contains(&config.password_hash_cost) {
            errors.push(ConfigValidationError::InvalidHashCost {
                value: config.password_hash_cost,
                minimum: Self::MIN_HASH_COST,
                maximum: Self::MAX_HASH_COST,
            });
        }

        for (name, value) in [
            ("jwt_access_expiration_secs", config.jwt_access_expiration_secs),
            ("jwt_refresh_expiration_secs", config.jwt_refresh_expiration_secs),
            ("reset_token_expiration_secs", config.reset_token_expiration_secs),
        ] {
            if value == 0 {
                errors.push(ConfigValidationError::NonPositiveTimeout {
                    name: name.to_string(),
                    value,
                });
            }
        }
    }

    fn validate_notification(config: &crate::NotificationConfig, errors: &mut Vec<ConfigValidationError>) {
        if let Err(e) = Url::parse(&config.reset_password_url) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "reset_password".to_string(),
                message: e.to_string(),
            });
        }
    }

    fn validate_observability(config: &crate::ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        let format = config.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}
