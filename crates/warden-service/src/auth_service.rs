//! Authentication service trait definition.

use crate::dto::{
    DetailResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
    TokenResponse, TokenUserData, UserResponse,
};
use async_trait::async_trait;
use warden_core::WardenResult;

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new user.
    async fn signup(&self, request: SignupRequest) -> WardenResult<UserResponse>;

    /// Issues a token pair for a password or refresh token grant.
    async fn login(&self, request: LoginRequest) -> WardenResult<TokenResponse>;

    /// Ends the session of the access token's owner.
    async fn logout(&self, access_token: &str) -> WardenResult<DetailResponse>;

    /// Sends a password reset link to a registered email.
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> WardenResult<DetailResponse>;

    /// Sets a new password using a reset token.
    async fn reset_password(&self, token: &str, request: ResetPasswordRequest) -> WardenResult<DetailResponse>;

    /// Resolves the active user behind an access token.
    async fn current_user(&self, access_token: &str) -> WardenResult<TokenUserData>;
}
