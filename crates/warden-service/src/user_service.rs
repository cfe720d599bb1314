//! User service trait definition.

use crate::dto::{DetailResponse, TokenUserData, UserPage, UserResponse, UserUpdateRequest};
use async_trait::async_trait;
use warden_core::{PageRequest, UserFilter, UserId, WardenResult};

/// User service trait.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Gets an active user by ID through the cache.
    async fn find_one(&self, id: UserId) -> WardenResult<UserResponse>;

    /// Lists one page of users matching `filter` through the cache.
    ///
    /// An empty page is `NotFound`.
    async fn find_all(&self, page: PageRequest, filter: UserFilter) -> WardenResult<UserPage>;

    /// Updates the caller's own profile.
    async fn edit_me(&self, current: &TokenUserData, request: UserUpdateRequest) -> WardenResult<UserResponse>;

    /// Updates any user's profile.
    async fn edit_one(&self, id: UserId, request: UserUpdateRequest) -> WardenResult<UserResponse>;

    /// Soft-deletes a user.
    async fn delete_one(&self, id: UserId) -> WardenResult<DetailResponse>;

    /// Grants or revokes administrative rights.
    async fn edit_superuser(&self, id: UserId, is_superuser: bool) -> WardenResult<UserResponse>;
}
