//! Authentication-related DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_core::{rules, User, UserId};
use warden_security::TokenPair;

/// Registration request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(
        length(min = 3, max = 32, message = "Username must be 3-32 characters"),
        custom(function = "rules::valid_username")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(max = 128, message = "Full name cannot exceed 128 characters"))]
    pub fullname: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub confirmation_password: String,
}

/// How a login request proves identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Username and password.
    Password,
    /// A refresh token from an earlier login.
    RefreshToken,
}

/// Login request.
///
/// `username` and `password` are required for the password grant,
/// `refresh_token` for the refresh grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub grant_type: GrantType,
    pub username: Option<String>,
    pub password: Option<String>,
    pub refresh_token: Option<String>,
}

impl LoginRequest {
    /// Password grant.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            grant_type: GrantType::Password,
            username: Some(username.into()),
            password: Some(password.into()),
            refresh_token: None,
        }
    }

    /// Refresh token grant.
    pub fn refresh(refresh_token: impl Into<String>) -> Self {
        Self {
            grant_type: GrantType::RefreshToken,
            username: None,
            password: None,
            refresh_token: Some(refresh_token.into()),
        }
    }
}

/// Issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
        }
    }
}

/// Request for a password reset link.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// New password submitted with a reset token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub confirmation_password: String,
}

/// The authenticated caller, resolved from an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUserData {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_superuser: bool,
    pub is_deleted: bool,
}

impl From<&User> for TokenUserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_superuser: user.is_superuser,
            is_deleted: user.is_deleted,
        }
    }
}
