//! JWT claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{User, UserId};

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,

    /// Username.
    pub username: String,

    /// User's email.
    pub email: String,

    /// Whether the user had administrative rights when the token was issued.
    #[serde(default)]
    pub is_superuser: bool,

    /// Token type.
    pub token_type: TokenType,

    /// Issued at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,

    /// Not before timestamp.
    pub nbf: i64,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// JWT ID (unique identifier for this token).
    pub jti: String,
}

impl Claims {
    /// Creates claims of `token_type` for `user`.
    #[must_use]
    pub fn for_user(
        user: &User,
        token_type: TokenType,
        issuer: &str,
        audience: &str,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            is_superuser: user.is_superuser,
            token_type,
            iat: now,
            exp: expires_at.timestamp(),
            nbf: now,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::now_v7().to_string(),
        }
    }

    /// Returns the user ID carried in `sub`.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }

    /// Returns the expiration time.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Token type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token sent with each request.
    Access,
    /// Long-lived token exchanged for a new pair at login.
    Refresh,
    /// Single-purpose token embedded in password reset links.
    Reset,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
            Self::Reset => write!(f, "reset"),
        }
    }
}
