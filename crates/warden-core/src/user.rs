//! User entity.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account as persisted by the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,

    /// Unique login name.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Display name.
    pub fullname: Option<String>,

    /// Argon2 hash of the password (never exposed via responses).
    #[serde(skip_serializing, default)]
    pub hashed_password: String,

    /// Refresh token issued at the last login, cleared on logout.
    #[serde(skip_serializing, default)]
    pub refresh_token: Option<String>,

    /// Whether the user has administrative rights.
    pub is_superuser: bool,

    /// Soft-delete flag.
    pub is_deleted: bool,

    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns true if the user has not been soft-deleted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Returns true if the user currently holds a refresh token.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub fullname: Option<String>,
    pub hashed_password: String,
    pub is_superuser: bool,
}

/// A partial update; `None` leaves the field untouched.
///
/// `refresh_token` is doubly optional so a change can clear the token.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub fullname: Option<String>,
    pub hashed_password: Option<String>,
    pub refresh_token: Option<Option<String>>,
    pub is_superuser: Option<bool>,
    pub is_deleted: Option<bool>,
}

impl UserChanges {
    /// Returns true if the change would not modify anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.fullname.is_none()
            && self.hashed_password.is_none()
            && self.refresh_token.is_none()
            && self.is_superuser.is_none()
            && self.is_deleted.is_none()
    }

    /// Applies the change to `user` in place.
    pub fn apply_to(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(fullname) = self.fullname {
            user.fullname = Some(fullname);
        }
        if let Some(hashed_password) = self.hashed_password {
            user.hashed_password = hashed_password;
        }
        if let Some(refresh_token) = self.refresh_token {
            user.refresh_token = refresh_token;
        }
        if let Some(is_superuser) = self.is_superuser {
            user.is_superuser = is_superuser;
        }
        if let Some(is_deleted) = self.is_deleted {
            user.is_deleted = is_deleted;
        }
    }
}

/// Equality filter over user fields; unset fields match everything.
///
/// Field order here is the order filters appear in list cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    pub id: Option<UserId>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_superuser: Option<bool>,
    pub is_deleted: Option<bool>,
}

impl UserFilter {
    /// Filter matching a single id.
    #[must_use]
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Filter matching a username.
    #[must_use]
    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    /// Filter matching an email address.
    #[must_use]
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Returns the set filters as `(field, value)` pairs in declaration order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.id {
            pairs.push(("id", id.to_string()));
        }
        if let Some(username) = &self.username {
            pairs.push(("username", username.clone()));
        }
        if let Some(email) = &self.email {
            pairs.push(("email", email.clone()));
        }
        if let Some(is_superuser) = self.is_superuser {
            pairs.push(("is_superuser", is_superuser.to_string()));
        }
        if let Some(is_deleted) = self.is_deleted {
            pairs.push(("is_deleted", is_deleted.to_string()));
        }
        pairs
    }

    /// Returns true if `user` satisfies every set filter.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        self.id.map_or(true, |id| user.id == id)
            && self.username.as_ref().map_or(true, |u| &user.username == u)
            && self
                .email
                .as_ref()
                .map_or(true, |e| user.email.eq_ignore_ascii_case(e))
            && self.is_superuser.map_or(true, |s| user.is_superuser == s)
            && self.is_deleted.map_or(true, |d| user.is_deleted == d)
    }
}
