//! User service implementation.

use crate::dto::{DetailResponse, TokenUserData, UserPage, UserResponse, UserUpdateRequest};
use crate::user_service::UserService;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use warden_cache::{keys, CacheBackend, CacheExt, Memoize};
use warden_core::{
    Page, PageRequest, UserChanges, UserFilter, UserId, ValidateExt, WardenError, WardenResult,
};
use warden_repository::UserRepository;

/// User service backed by a repository and a read-through cache.
pub struct UserServiceImpl {
    repository: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheBackend>,
    ttl: Duration,
}

impl UserServiceImpl {
    /// Creates a new user service; cached entries live for `ttl`.
    pub fn new(repository: Arc<dyn UserRepository>, cache: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self { repository, cache, ttl }
    }

    async fn ensure_email_free(&self, email: Option<&str>) -> WardenResult<()> {
        if let Some(email) = email {
            if self.repository.exists(&UserFilter::by_email(email)).await? {
                return Err(WardenError::conflict(format!("Email '{}' already exists", email)));
            }
        }
        Ok(())
    }

    async fn update_and_invalidate(&self, id: UserId, changes: UserChanges) -> WardenResult<UserResponse> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(WardenError::not_found("User", id));
        }

        let user = self.repository.update(id, changes).await?;
        invalidate_user(self.cache.as_ref(), id).await?;
        Ok(UserResponse::from(user))
    }
}

/// Drops the cached copy of one user and every cached page.
pub(crate) async fn invalidate_user(cache: &dyn CacheBackend, id: UserId) -> WardenResult<()> {
    cache.delete(&keys::user(id)).await?;
    invalidate_pages(cache).await
}

/// Drops every cached page of users.
pub(crate) async fn invalidate_pages(cache: &dyn CacheBackend) -> WardenResult<()> {
    let removed = cache.delete_namespace(keys::USERS_NAMESPACE).await?;
    debug!(removed, "User pages invalidated");
    Ok(())
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn find_one(&self, id: UserId) -> WardenResult<UserResponse> {
        debug!("Getting user: {}", id);

        Memoize::new(keys::USER, self.ttl)
            .run(self.cache.as_ref(), &(id,), || async {
                self.repository
                    .find_by_id(id)
                    .await?
                    .filter(|user| user.is_active())
                    .map(UserResponse::from)
                    .ok_or_else(|| WardenError::not_found("User", id))
            })
            .await
    }

    async fn find_all(&self, page: PageRequest, filter: UserFilter) -> WardenResult<UserPage> {
        page.validate_request()?;
        let key = keys::users_page(&filter, page);
        debug!("Listing users: {}", key);

        if let Some(cached) = self.cache.get_as::<UserPage>(&key).await? {
            return Ok(cached);
        }

        let users = self.repository.find_page(&filter, page).await?;
        if users.is_empty() {
            return Err(WardenError::not_found("Page", page.offset));
        }
        let total = self.repository.count(&filter).await?;

        let result = Page::new(users, page, total).map(UserResponse::from);
        self.cache.set_as(&key, &result, self.ttl).await?;
        Ok(result)
    }

    async fn edit_me(&self, current: &TokenUserData, request: UserUpdateRequest) -> WardenResult<UserResponse> {
        request.validate_request()?;
        self.ensure_email_free(request.email.as_deref()).await?;

        let user = self.update_and_invalidate(current.id, request.into()).await?;
        info!("User updated own profile: {}", current.id);
        Ok(user)
    }

    async fn edit_one(&self, id: UserId, request: UserUpdateRequest) -> WardenResult<UserResponse> {
        request.validate_request()?;
        self.ensure_email_free(request.email.as_deref()).await?;

        let user = self.update_and_invalidate(id, request.into()).await?;
        info!("User updated: {}", id);
        Ok(user)
    }

    async fn delete_one(&self, id: UserId) -> WardenResult<DetailResponse> {
        let changes = UserChanges {
            is_deleted: Some(true),
            ..UserChanges::default()
        };
        let user = self.update_and_invalidate(id, changes).await?;

        info!("User deleted: {}", id);
        Ok(DetailResponse::new(format!("Deleted id={}", user.id)))
    }

    async fn edit_superuser(&self, id: UserId, is_superuser: bool) -> WardenResult<UserResponse> {
        let changes = UserChanges {
            is_superuser: Some(is_superuser),
            ..UserChanges::default()
        };
        let user = self.update_and_invalidate(id, changes).await?;

        info!("Superuser flag of user {} set to {}", id, is_superuser);
        Ok(user)
    }
}
