//! In-memory user store.

use crate::UserRepository;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;
use warden_core::{
    NewUser, PageRequest, User, UserChanges, UserFilter, UserId, WardenError, WardenResult,
};

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<UserId, User>,
    last_id: i64,
}

/// User store kept in process memory.
///
/// Ids are assigned sequentially from 1. Uniqueness of usernames and emails
/// is enforced by the service layer, not here.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: RwLock<Store>,
}

impl InMemoryUserRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, filter: &UserFilter) -> Vec<User> {
        self.store
            .read()
            .users
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> WardenResult<Option<User>> {
        Ok(self.store.read().users.get(&id).cloned())
    }

    async fn find_one(&self, filter: &UserFilter) -> WardenResult<Option<User>> {
        Ok(self
            .store
            .read()
            .users
            .values()
            .find(|user| filter.matches(user))
            .cloned())
    }

    async fn find_page(&self, filter: &UserFilter, page: PageRequest) -> WardenResult<Vec<User>> {
        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit).unwrap_or(usize::MAX);

        Ok(self.matching(filter).into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self, filter: &UserFilter) -> WardenResult<u64> {
        let store = self.store.read();
        let count = store.users.values().filter(|user| filter.matches(user)).count();
        Ok(count as u64)
    }

    async fn create(&self, new_user: NewUser) -> WardenResult<User> {
        let mut store = self.store.write();
        store.last_id += 1;

        let user = User {
            id: UserId(store.last_id),
            username: new_user.username,
            email: new_user.email,
            fullname: new_user.fullname,
            hashed_password: new_user.hashed_password,
            refresh_token: None,
            is_superuser: new_user.is_superuser,
            is_deleted: false,
            created_at: Utc::now(),
        };

        store.users.insert(user.id, user.clone());
        debug!(user_id = %user.id, "User stored");
        Ok(user)
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> WardenResult<User> {
        let mut store = self.store.write();
        let user = store
            .users
            .get_mut(&id)
            .ok_or_else(|| WardenError::not_found("User", id))?;

        changes.apply_to(user);
        debug!(user_id = %id, "User updated");
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            fullname: None,
            hashed_password: "hashed_password".to_string(),
            is_superuser: false,
        }
    }

    async fn seeded(count: usize) -> InMemoryUserRepository {
        let repo = InMemoryUserRepository::new();
        for i in 1..=count {
            repo.create(new_user(&format!("user{}", i), &format!("user{}@example.com", i)))
                .await
                .unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(new_user("alice", "alice@example.com")).await.unwrap();
        let second = repo.create(new_user("bob", "bob@example.com")).await.unwrap();

        assert_eq!(first.id, UserId(1));
        assert_eq!(second.id, UserId(2));
        assert!(!first.is_deleted);
        assert!(first.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let repo = seeded(1).await;
        let found = repo.find_by_id(UserId(1)).await.unwrap();
        assert_eq!(found.unwrap().username, "user1");
        assert!(repo.find_by_id(UserId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_one_by_email_ignores_case() {
        let repo = seeded(2).await;
        let found = repo
            .find_one(&UserFilter::by_email("USER2@example.com"))
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, UserId(2));
    }

    #[tokio::test]
    async fn test_exists() {
        let repo = seeded(1).await;
        assert!(repo.exists(&UserFilter::by_username("user1")).await.unwrap());
        assert!(!repo.exists(&UserFilter::by_username("ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_page_uses_page_numbers() {
        let repo = seeded(5).await;
        let filter = UserFilter::default();

        let first = repo.find_page(&filter, PageRequest::new(2, 1)).await.unwrap();
        let third = repo.find_page(&filter, PageRequest::new(2, 3)).await.unwrap();
        let beyond = repo.find_page(&filter, PageRequest::new(2, 4)).await.unwrap();

        assert_eq!(first.iter().map(|u| u.id.0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(third.iter().map(|u| u.id.0).collect::<Vec<_>>(), vec![5]);
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_count_with_filter() {
        let repo = seeded(3).await;
        repo.update(
            UserId(2),
            UserChanges {
                is_deleted: Some(true),
                ..UserChanges::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(repo.count(&UserFilter::default()).await.unwrap(), 3);
        let active = UserFilter {
            is_deleted: Some(false),
            ..UserFilter::default()
        };
        assert_eq!(repo.count(&active).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_returns_fresh_user() {
        let repo = seeded(1).await;
        let updated = repo
            .update(
                UserId(1),
                UserChanges {
                    fullname: Some("User One".to_string()),
                    refresh_token: Some(Some("token".to_string())),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.fullname.as_deref(), Some("User One"));
        assert_eq!(updated.refresh_token.as_deref(), Some("token"));
        assert_eq!(repo.find_by_id(UserId(1)).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let result = repo.update(UserId(7), UserChanges::default()).await;
        assert!(matches!(result, Err(WardenError::NotFound { .. })));
    }
}
