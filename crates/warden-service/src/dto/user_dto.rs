//! User-related DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_core::{Page, User, UserChanges, UserId};

/// Profile changes submitted by a user or an administrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdateRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(max = 128, message = "Full name cannot exceed 128 characters"))]
    pub fullname: Option<String>,
}

impl From<UserUpdateRequest> for UserChanges {
    fn from(request: UserUpdateRequest) -> Self {
        Self {
            email: request.email,
            fullname: request.fullname,
            ..Self::default()
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub fullname: Option<String>,
    pub is_superuser: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            fullname: user.fullname,
            is_superuser: user.is_superuser,
            is_deleted: user.is_deleted,
            created_at: user.created_at,
        }
    }
}

/// A page of users as cached and returned by listing.
pub type UserPage = Page<UserResponse>;

/// Plain message response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl DetailResponse {
    /// Creates a response with only a message.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            success: None,
        }
    }

    /// Creates a response flagged as successful.
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            success: Some(true),
        }
    }
}
