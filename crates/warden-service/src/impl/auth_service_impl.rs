//! Authentication service implementation.

use super::user_service_impl::invalidate_pages;
use crate::auth_service::AuthService;
use crate::dto::{
    DetailResponse, ForgotPasswordRequest, GrantType, LoginRequest, ResetPasswordRequest, SignupRequest,
    TokenResponse, TokenUserData, UserResponse,
};
use crate::notifier::PasswordResetNotifier;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warden_cache::CacheBackend;
use warden_core::{NewUser, User, UserChanges, UserFilter, ValidateExt, WardenError, WardenResult};
use warden_repository::UserRepository;
use warden_security::{PasswordHasherInterface, TokenProviderInterface};

/// Authentication service implementation.
pub struct AuthServiceImpl {
    repository: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheBackend>,
    password_hasher: Arc<dyn PasswordHasherInterface>,
    token_provider: Arc<dyn TokenProviderInterface>,
    notifier: Arc<dyn PasswordResetNotifier>,
}

impl AuthServiceImpl {
    /// Creates a new auth service.
    pub fn new(
        repository: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheBackend>,
        password_hasher: Arc<dyn PasswordHasherInterface>,
        token_provider: Arc<dyn TokenProviderInterface>,
        notifier: Arc<dyn PasswordResetNotifier>,
    ) -> Self {
        Self {
            repository,
            cache,
            password_hasher,
            token_provider,
            notifier,
        }
    }

    async fn user_by_username(&self, username: &str) -> WardenResult<Option<User>> {
        self.repository.find_one(&UserFilter::by_username(username)).await
    }

    async fn user_by_email(&self, email: &str) -> WardenResult<User> {
        self.repository
            .find_one(&UserFilter::by_email(email))
            .await?
            .ok_or_else(|| WardenError::not_found("User", email))
    }

    /// Returns the user and, when the stored hash uses outdated parameters,
    /// a replacement hash of the same password.
    async fn authenticate_password(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> WardenResult<(User, Option<String>)> {
        let (Some(username), Some(password)) = (username, password) else {
            return Err(WardenError::validation("Username and password are required"));
        };

        let user = match self.user_by_username(username).await? {
            Some(user) if user.is_active() => user,
            _ => {
                warn!("Login failed: unknown user {}", username);
                return Err(WardenError::InvalidCredentials);
            }
        };

        if !self.password_hasher.verify(password, &user.hashed_password)? {
            warn!("Login failed: wrong password for {}", username);
            return Err(WardenError::InvalidCredentials);
        }

        let rehashed = if self.password_hasher.needs_rehash(&user.hashed_password) {
            debug!("Rehashing password for user {}", user.id);
            Some(self.password_hasher.hash(password)?)
        } else {
            None
        };

        Ok((user, rehashed))
    }

    async fn authenticate_refresh(&self, refresh_token: Option<&str>) -> WardenResult<User> {
        let refresh_token =
            refresh_token.ok_or_else(|| WardenError::validation("Refresh token is required"))?;
        let claims = self.token_provider.validate_refresh_token(refresh_token)?;

        match self.user_by_username(&claims.username).await? {
            Some(user) if user.is_active() => Ok(user),
            _ => {
                warn!("Refresh failed: user {} no longer exists", claims.username);
                Err(WardenError::InvalidCredentials)
            }
        }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn signup(&self, request: SignupRequest) -> WardenResult<UserResponse> {
        debug!("Signing up user: {}", request.username);
        request.validate_request()?;

        if self.repository.exists(&UserFilter::by_username(&request.username)).await? {
            return Err(WardenError::conflict(format!(
                "Username '{}' already exists",
                request.username
            )));
        }
        if self.repository.exists(&UserFilter::by_email(&request.email)).await? {
            return Err(WardenError::conflict(format!("Email '{}' already exists", request.email)));
        }

        let hashed_password = self
            .password_hasher
            .hash_confirmed(&request.password, &request.confirmation_password)?;

        let user = self
            .repository
            .create(NewUser {
                username: request.username,
                email: request.email,
                fullname: request.fullname,
                hashed_password,
                is_superuser: false,
            })
            .await?;
        invalidate_pages(self.cache.as_ref()).await?;

        info!("User signed up: {}", user.id);
        Ok(UserResponse::from(user))
    }

    async fn login(&self, request: LoginRequest) -> WardenResult<TokenResponse> {
        let (user, hashed_password) = match request.grant_type {
            GrantType::Password => {
                self.authenticate_password(request.username.as_deref(), request.password.as_deref())
                    .await?
            }
            GrantType::RefreshToken => {
                let user = self.authenticate_refresh(request.refresh_token.as_deref()).await?;
                (user, None)
            }
        };

        let tokens = self.token_provider.generate_tokens(&user)?;
        self.repository
            .update(
                user.id,
                UserChanges {
                    hashed_password,
                    refresh_token: Some(Some(tokens.refresh_token.clone())),
                    ..UserChanges::default()
                },
            )
            .await?;

        info!("User logged in: {}", user.id);
        Ok(TokenResponse::from(tokens))
    }

    async fn logout(&self, access_token: &str) -> WardenResult<DetailResponse> {
        let claims = self.token_provider.validate_access_token(access_token)?;

        let user = match self.user_by_username(&claims.username).await? {
            Some(user) if user.has_session() => user,
            _ => return Err(WardenError::unauthorized("No active session")),
        };

        self.repository
            .update(
                user.id,
                UserChanges {
                    refresh_token: Some(None),
                    ..UserChanges::default()
                },
            )
            .await?;

        info!("User logged out: {}", user.id);
        Ok(DetailResponse::new("Logout successful"))
    }

    async fn forgot_password(&self, request: ForgotPasswordRequest) -> WardenResult<DetailResponse> {
        request.validate_request()?;
        let user = self.user_by_email(&request.email).await?;
        let token = self.token_provider.generate_reset_token(&user)?;

        let notifier = Arc::clone(&self.notifier);
        let email = user.email.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send_reset_link(&email, &token).await {
                error!("Failed to send password reset link to {}: {}", email, e);
            }
        });

        Ok(DetailResponse::success(format!(
            "Reset link sent to {} from {}; check your inbox, including the spam folder",
            request.email,
            self.notifier.sender()
        )))
    }

    async fn reset_password(&self, token: &str, request: ResetPasswordRequest) -> WardenResult<DetailResponse> {
        request.validate_request()?;
        let claims = self.token_provider.validate_reset_token(token)?;
        let user = self.user_by_email(&claims.email).await?;

        let hashed_password = self
            .password_hasher
            .hash_confirmed(&request.password, &request.confirmation_password)?;
        self.repository
            .update(
                user.id,
                UserChanges {
                    hashed_password: Some(hashed_password),
                    ..UserChanges::default()
                },
            )
            .await?;

        info!("Password reset for user {}", user.id);
        Ok(DetailResponse::new("Password has been reset"))
    }

    async fn current_user(&self, access_token: &str) -> WardenResult<TokenUserData> {
        let claims = self.token_provider.validate_access_token(access_token)?;
        let id = claims
            .user_id()
            .ok_or_else(|| WardenError::InvalidToken("Token subject is not a user id".to_string()))?;

        match self.repository.find_by_id(id).await? {
            Some(user) if user.is_active() => Ok(TokenUserData::from(&user)),
            _ => Err(WardenError::unauthorized("User no longer exists")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r#impl::test_support::{hasher, seed_user, token_provider, MockBackend, RecordingNotifier, TTL};
    use crate::UserService;
    use crate::UserServiceImpl;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use warden_cache::{keys, CacheExt, MemoryCache};
    use warden_core::{PageRequest, UserId};
    use warden_repository::InMemoryUserRepository;
    use warden_security::PasswordHasher;

    struct Fixture {
        repo: Arc<InMemoryUserRepository>,
        cache: Arc<MemoryCache>,
        service: AuthServiceImpl,
        sent: UnboundedReceiver<(String, String)>,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryUserRepository::new());
        let cache = Arc::new(MemoryCache::new());
        let (notifier, sent) = RecordingNotifier::new();
        let service = AuthServiceImpl::new(
            repo.clone(),
            cache.clone(),
            hasher(),
            token_provider(),
            Arc::new(notifier),
        );
        Fixture {
            repo,
            cache,
            service,
            sent,
        }
    }

    fn signup_request(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            fullname: Some("Frank".to_string()),
            password: "password123".to_string(),
            confirmation_password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_user() {
        let f = fixture();
        let user = f.service.signup(signup_request("frank", "frank@example.com")).await.unwrap();

        assert_eq!(user.id, UserId(1));
        let stored = f.repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(hasher().verify("password123", &stored.hashed_password).unwrap());
    }

    #[tokio::test]
    async fn test_signup_invalidates_cached_pages() {
        let f = fixture();
        seed_user(f.repo.as_ref(), "user1", "a@x.com", "password").await;
        let users = UserServiceImpl::new(f.repo.clone(), f.cache.clone(), TTL);
        users
            .find_all(PageRequest::default(), UserFilter::by_email("a@x.com"))
            .await
            .unwrap();
        assert!(f.cache.get("users:email:a@x.com:limit:10:offset:1").await.unwrap().is_some());

        f.service.signup(signup_request("frank", "frank@example.com")).await.unwrap();

        assert!(f.cache.get("users:email:a@x.com:limit:10:offset:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_signup_conflicts() {
        let f = fixture();
        f.service.signup(signup_request("frank", "frank@example.com")).await.unwrap();

        let same_name = f.service.signup(signup_request("frank", "other@example.com")).await;
        let same_email = f.service.signup(signup_request("other", "frank@example.com")).await;

        assert!(matches!(same_name, Err(WardenError::Conflict(m)) if m.contains("Username")));
        assert!(matches!(same_email, Err(WardenError::Conflict(m)) if m.contains("Email")));
    }

    #[tokio::test]
    async fn test_signup_password_mismatch() {
        let f = fixture();
        let mut request = signup_request("frank", "frank@example.com");
        request.confirmation_password = "different123".to_string();

        assert!(matches!(f.service.signup(request).await, Err(WardenError::Validation(_))));
        assert_eq!(f.repo.count(&UserFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_login_with_password_stores_refresh_token() {
        let f = fixture();
        seed_user(f.repo.as_ref(), "gina", "gina@example.com", "password").await;

        let tokens = f.service.login(LoginRequest::password("gina", "password")).await.unwrap();

        assert_eq!(tokens.token_type, "Bearer");
        let stored = f.repo.find_by_id(UserId(1)).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(tokens.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_login_upgrades_outdated_password_hash() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let seeded = seed_user(repo.as_ref(), "gina", "gina@example.com", "password").await;
        let stronger = Arc::new(PasswordHasher::with_cost(2));
        let (notifier, _sent) = RecordingNotifier::new();
        let service = AuthServiceImpl::new(
            repo.clone(),
            Arc::new(MemoryCache::new()),
            stronger.clone(),
            token_provider(),
            Arc::new(notifier),
        );

        service.login(LoginRequest::password("gina", "password")).await.unwrap();

        let stored = repo.find_by_id(seeded.id).await.unwrap().unwrap();
        assert_ne!(stored.hashed_password, seeded.hashed_password);
        assert!(!stronger.needs_rehash(&stored.hashed_password));
        service.login(LoginRequest::password("gina", "password")).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_keeps_current_password_hash() {
        let f = fixture();
        let seeded = seed_user(f.repo.as_ref(), "gina", "gina@example.com", "password").await;

        f.service.login(LoginRequest::password("gina", "password")).await.unwrap();

        let stored = f.repo.find_by_id(seeded.id).await.unwrap().unwrap();
        assert_eq!(stored.hashed_password, seeded.hashed_password);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let f = fixture();
        seed_user(f.repo.as_ref(), "gina", "gina@example.com", "password").await;

        let wrong = f.service.login(LoginRequest::password("gina", "nope")).await;
        let unknown = f.service.login(LoginRequest::password("ghost", "password")).await;

        assert!(matches!(wrong, Err(WardenError::InvalidCredentials)));
        assert!(matches!(unknown, Err(WardenError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let f = fixture();
        let mut request = LoginRequest::password("gina", "password");
        request.password = None;
        assert!(matches!(f.service.login(request).await, Err(WardenError::Validation(_))));

        let mut request = LoginRequest::refresh("t");
        request.refresh_token = None;
        assert!(matches!(f.service.login(request).await, Err(WardenError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_with_refresh_token() {
        let f = fixture();
        seed_user(f.repo.as_ref(), "gina", "gina@example.com", "password").await;
        let first = f.service.login(LoginRequest::password("gina", "password")).await.unwrap();

        let second = f.service.login(LoginRequest::refresh(&first.refresh_token)).await.unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        let stored = f.repo.find_by_id(UserId(1)).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token, Some(second.refresh_token));
    }

    #[tokio::test]
    async fn test_access_token_is_not_a_refresh_grant() {
        let f = fixture();
        seed_user(f.repo.as_ref(), "gina", "gina@example.com", "password").await;
        let tokens = f.service.login(LoginRequest::password("gina", "password")).await.unwrap();

        let result = f.service.login(LoginRequest::refresh(&tokens.access_token)).await;
        assert!(matches!(result, Err(WardenError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let f = fixture();
        seed_user(f.repo.as_ref(), "hank", "hank@example.com", "password").await;
        let tokens = f.service.login(LoginRequest::password("hank", "password")).await.unwrap();

        let detail = f.service.logout(&tokens.access_token).await.unwrap();

        assert_eq!(detail, DetailResponse::new("Logout successful"));
        assert!(!f.repo.find_by_id(UserId(1)).await.unwrap().unwrap().has_session());

        let again = f.service.logout(&tokens.access_token).await;
        assert!(matches!(again, Err(WardenError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_forgot_password_dispatches_link() {
        let mut f = fixture();
        seed_user(f.repo.as_ref(), "ivy", "ivy@example.com", "password").await;

        let detail = f
            .service
            .forgot_password(ForgotPasswordRequest {
                email: "ivy@example.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(detail.success, Some(true));
        assert!(detail.detail.contains("ivy@example.com"));
        assert!(detail.detail.contains("noreply@example.com"));

        let (email, token) = tokio::time::timeout(Duration::from_secs(5), f.sent.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(email, "ivy@example.com");
        assert_eq!(token_provider().validate_reset_token(&token).unwrap().email, email);
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email() {
        let f = fixture();
        let result = f
            .service
            .forgot_password(ForgotPasswordRequest {
                email: "nobody@example.com".to_string(),
            })
            .await;
        assert!(matches!(result, Err(WardenError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reset_password() {
        let f = fixture();
        let user = seed_user(f.repo.as_ref(), "jill", "jill@example.com", "password").await;
        let token = token_provider().generate_reset_token(&user).unwrap();

        f.service
            .reset_password(
                &token,
                ResetPasswordRequest {
                    password: "new-password".to_string(),
                    confirmation_password: "new-password".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(f.service.login(LoginRequest::password("jill", "new-password")).await.is_ok());
        assert!(matches!(
            f.service.login(LoginRequest::password("jill", "password")).await,
            Err(WardenError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_session_token() {
        let f = fixture();
        seed_user(f.repo.as_ref(), "jill", "jill@example.com", "password").await;
        let tokens = f.service.login(LoginRequest::password("jill", "password")).await.unwrap();

        let result = f
            .service
            .reset_password(
                &tokens.access_token,
                ResetPasswordRequest {
                    password: "new-password".to_string(),
                    confirmation_password: "new-password".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(WardenError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_current_user() {
        let f = fixture();
        seed_user(f.repo.as_ref(), "kim", "kim@example.com", "password").await;
        let tokens = f.service.login(LoginRequest::password("kim", "password")).await.unwrap();

        let current = f.service.current_user(&tokens.access_token).await.unwrap();
        assert_eq!(current.username, "kim");

        let users = UserServiceImpl::new(f.repo.clone(), f.cache.clone(), TTL);
        users.delete_one(current.id).await.unwrap();
        assert!(matches!(
            f.service.current_user(&tokens.access_token).await,
            Err(WardenError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_fails_when_invalidation_fails() {
        let mut backend = MockBackend::new();
        backend
            .expect_delete_namespace()
            .returning(|_| Err(WardenError::cache("connection refused")));
        let (notifier, _sent) = RecordingNotifier::new();
        let service = AuthServiceImpl::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(backend),
            hasher(),
            token_provider(),
            Arc::new(notifier),
        );

        let result = service.signup(signup_request("lee", "lee@example.com")).await;
        assert!(matches!(result, Err(WardenError::Cache(_))));
    }

    #[tokio::test]
    async fn test_login_keeps_cached_user_entry() {
        let f = fixture();
        let user = seed_user(f.repo.as_ref(), "max", "max@example.com", "password").await;
        f.cache
            .set_as(&keys::user(user.id), &json!({"marker": true}), TTL)
            .await
            .unwrap();

        f.service.login(LoginRequest::password("max", "password")).await.unwrap();

        assert!(f.cache.get(&keys::user(user.id)).await.unwrap().is_some());
    }
}
