//! Repository trait definitions.

use async_trait::async_trait;
use warden_core::{NewUser, PageRequest, User, UserChanges, UserFilter, UserId, WardenResult};

/// User repository trait.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by ID, soft-deleted users included.
    async fn find_by_id(&self, id: UserId) -> WardenResult<Option<User>>;

    /// Finds the first user matching `filter`, in id order.
    async fn find_one(&self, filter: &UserFilter) -> WardenResult<Option<User>>;

    /// Returns one page of users matching `filter`, in id order.
    async fn find_page(&self, filter: &UserFilter, page: PageRequest) -> WardenResult<Vec<User>>;

    /// Counts users matching `filter`.
    async fn count(&self, filter: &UserFilter) -> WardenResult<u64>;

    /// Stores a new user and returns it with its assigned id.
    async fn create(&self, user: NewUser) -> WardenResult<User>;

    /// Applies `changes` and returns the updated user.
    ///
    /// Returns `NotFound` if no user has `id`.
    async fn update(&self, id: UserId, changes: UserChanges) -> WardenResult<User>;

    /// Returns true if any user matches `filter`.
    async fn exists(&self, filter: &UserFilter) -> WardenResult<bool> {
        Ok(self.find_one(filter).await?.is_some())
    }
}
