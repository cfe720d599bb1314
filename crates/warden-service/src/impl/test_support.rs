//! Shared fixtures for service tests.

use crate::notifier::PasswordResetNotifier;
use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use warden_cache::CacheBackend;
use warden_config::SecurityConfig;
use warden_core::{NewUser, User, WardenResult};
use warden_repository::UserRepository;
use warden_security::{PasswordHasher, PasswordHasherInterface, TokenProvider};

pub(crate) const TTL: Duration = Duration::from_secs(60);

mock! {
    pub Backend {}

    #[async_trait]
    impl CacheBackend for Backend {
        fn name(&self) -> &'static str;
        async fn get(&self, key: &str) -> WardenResult<Option<Value>>;
        async fn set(&self, key: &str, value: Value, ttl: Duration) -> WardenResult<()>;
        async fn delete(&self, key: &str) -> WardenResult<()>;
        async fn delete_namespace(&self, prefix: &str) -> WardenResult<u64>;
    }
}

pub(crate) fn hasher() -> Arc<PasswordHasher> {
    Arc::new(PasswordHasher::with_cost(1))
}

pub(crate) fn token_provider() -> Arc<TokenProvider> {
    Arc::new(TokenProvider::new(Arc::new(SecurityConfig {
        jwt_secret: "service-test-secret-0123456789abcdef".to_string(),
        ..SecurityConfig::default()
    })))
}

pub(crate) async fn seed_user(
    repo: &dyn UserRepository,
    username: &str,
    email: &str,
    password: &str,
) -> User {
    let hashed_password = hasher().hash(password).unwrap();
    repo.create(NewUser {
        username: username.to_string(),
        email: email.to_string(),
        fullname: None,
        hashed_password,
        is_superuser: false,
    })
    .await
    .unwrap()
}

/// Notifier that forwards each reset link to a channel.
pub(crate) struct RecordingNotifier {
    tx: mpsc::UnboundedSender<(String, String)>,
}

impl RecordingNotifier {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<(String, String)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl PasswordResetNotifier for RecordingNotifier {
    fn sender(&self) -> &str {
        "noreply@example.com"
    }

    async fn send_reset_link(&self, email: &str, token: &str) -> WardenResult<()> {
        let _ = self.tx.send((email.to_string(), token.to_string()));
        Ok(())
    }
}
