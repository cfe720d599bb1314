//! Explicit dependency wiring.
//!
//! `AppModuleBuilder` assembles the repository, cache, security components and
//! notifier into the two services. Every collaborator can be swapped before
//! `build`; anything left unset falls back to its in-process default.

use std::sync::Arc;
use std::time::Duration;
use warden_cache::{CacheBackend, MemoryCache};
use warden_config::{AppConfig, CacheConfig, NotificationConfig, SecurityConfig};
use warden_repository::{InMemoryUserRepository, UserRepository};
use warden_security::{PasswordHasher, PasswordHasherInterface, TokenProvider, TokenProviderInterface};
use warden_service::{
    AuthService, AuthServiceImpl, LoggingNotifier, PasswordResetNotifier, UserService, UserServiceImpl,
};

// ============================================================================
// Module
// ============================================================================

/// Resolved application components.
#[derive(Clone)]
pub struct AppModule {
    repository: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheBackend>,
    token_provider: Arc<dyn TokenProviderInterface>,
    user_service: Arc<dyn UserService>,
    auth_service: Arc<dyn AuthService>,
}

impl AppModule {
    /// Returns a builder with nothing configured.
    #[must_use]
    pub fn builder() -> AppModuleBuilder {
        AppModuleBuilder::new()
    }

    /// The durable store.
    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.repository)
    }

    /// The cache both services read through.
    pub fn cache(&self) -> Arc<dyn CacheBackend> {
        Arc::clone(&self.cache)
    }

    /// The token provider, for callers that validate tokens themselves.
    pub fn token_provider(&self) -> Arc<dyn TokenProviderInterface> {
        Arc::clone(&self.token_provider)
    }

    /// The user service.
    pub fn user_service(&self) -> Arc<dyn UserService> {
        Arc::clone(&self.user_service)
    }

    /// The authentication service.
    pub fn auth_service(&self) -> Arc<dyn AuthService> {
        Arc::clone(&self.auth_service)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`AppModule`].
#[derive(Default)]
pub struct AppModuleBuilder {
    repository: Option<Arc<dyn UserRepository>>,
    cache: Option<Arc<dyn CacheBackend>>,
    cache_ttl: Option<Duration>,
    security_config: Option<SecurityConfig>,
    notifier: Option<Arc<dyn PasswordResetNotifier>>,
}

impl AppModuleBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the entry lifetime, security settings and notifier from `config`.
    #[must_use]
    pub fn with_config(self, config: &AppConfig) -> Self {
        self.with_cache_config(&config.cache)
            .with_security_config(config.security.clone())
            .with_notification_config(config.notification.clone())
    }

    /// Sets the user repository.
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn UserRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Sets the cache backend.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the entry lifetime from the cache settings.
    #[must_use]
    pub fn with_cache_config(mut self, config: &CacheConfig) -> Self {
        self.cache_ttl = Some(config.expire());
        self
    }

    /// Sets the JWT and hashing settings.
    #[must_use]
    pub fn with_security_config(mut self, config: SecurityConfig) -> Self {
        self.security_config = Some(config);
        self
    }

    /// Uses a [`LoggingNotifier`] built from `config`.
    #[must_use]
    pub fn with_notification_config(self, config: NotificationConfig) -> Self {
        self.with_notifier(Arc::new(LoggingNotifier::new(config)))
    }

    /// Sets the password reset notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn PasswordResetNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Wires the services.
    #[must_use]
    pub fn build(self) -> AppModule {
        let security_config = Arc::new(self.security_config.unwrap_or_default());
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new()));
        let cache = self.cache.unwrap_or_else(|| Arc::new(MemoryCache::new()));
        let cache_ttl = self.cache_ttl.unwrap_or_else(|| CacheConfig::default().expire());
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(LoggingNotifier::new(NotificationConfig::default())));

        let password_hasher: Arc<dyn PasswordHasherInterface> =
            Arc::new(PasswordHasher::with_cost(security_config.password_hash_cost));
        let token_provider: Arc<dyn TokenProviderInterface> =
            Arc::new(TokenProvider::new(Arc::clone(&security_config)));

        let user_service: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(
            Arc::clone(&repository),
            Arc::clone(&cache),
            cache_ttl,
        ));
        let auth_service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            Arc::clone(&repository),
            Arc::clone(&cache),
            password_hasher,
            Arc::clone(&token_provider),
            notifier,
        ));

        AppModule {
            repository,
            cache,
            token_provider,
            user_service,
            auth_service,
        }
    }
}
