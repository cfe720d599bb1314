//! JWT token provider for creating and validating tokens.

use super::{Claims, TokenType};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, warn};
use warden_config::SecurityConfig;
use warden_core::{User, WardenError, WardenResult};

/// Token pair containing access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: i64,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: i64,
    /// Token type (always "Bearer").
    pub token_type: String,
}

/// Issuing and validation of signed tokens.
pub trait TokenProviderInterface: Send + Sync {
    /// Issues a fresh access and refresh token for `user`.
    fn generate_tokens(&self, user: &User) -> WardenResult<TokenPair>;

    /// Issues a password reset token for `user`.
    fn generate_reset_token(&self, user: &User) -> WardenResult<String>;

    /// Validates a token of the given type and returns its claims.
    fn validate(&self, token: &str, expected: TokenType) -> WardenResult<Claims>;

    /// Validates an access token.
    fn validate_access_token(&self, token: &str) -> WardenResult<Claims> {
        self.validate(token, TokenType::Access)
    }

    /// Validates a refresh token.
    fn validate_refresh_token(&self, token: &str) -> WardenResult<Claims> {
        self.validate(token, TokenType::Refresh)
    }

    /// Validates a password reset token.
    fn validate_reset_token(&self, token: &str) -> WardenResult<Claims> {
        self.validate(token, TokenType::Reset)
    }
}

/// HS256 token provider.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: Arc<SecurityConfig>,
    validation: Validation,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            encoding_key,
            decoding_key,
            config,
            validation,
        }
    }

    fn issue(&self, user: &User, token_type: TokenType, lifetime_secs: u64) -> WardenResult<(String, i64)> {
        let expires_at = i64::try_from(lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| WardenError::configuration(format!("Invalid {} token lifetime", token_type)))?;
        let claims = Claims::for_user(
            user,
            token_type,
            &self.config.jwt_issuer,
            &self.config.jwt_audience,
            expires_at,
        );

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| WardenError::Internal(format!("Failed to generate {} token: {}", token_type, e)))?;

        debug!("Generated {} token for user {}", token_type, user.id);
        Ok((token, claims.exp))
    }
}

impl TokenProviderInterface for TokenProvider {
    fn generate_tokens(&self, user: &User) -> WardenResult<TokenPair> {
        let (access_token, access_expires_at) =
            self.issue(user, TokenType::Access, self.config.jwt_access_expiration_secs)?;
        let (refresh_token, refresh_expires_at) =
            self.issue(user, TokenType::Refresh, self.config.jwt_refresh_expiration_secs)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
            token_type: "Bearer".to_string(),
        })
    }

    fn generate_reset_token(&self, user: &User) -> WardenResult<String> {
        self.issue(user, TokenType::Reset, self.config.reset_token_expiration_secs)
            .map(|(token, _)| token)
    }

    fn validate(&self, token: &str, expected: TokenType) -> WardenResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Token validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => WardenError::TokenExpired,
                    ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                        WardenError::InvalidToken("Invalid token signature".to_string())
                    }
                    ErrorKind::InvalidIssuer => WardenError::InvalidToken("Invalid token issuer".to_string()),
                    ErrorKind::InvalidAudience => {
                        WardenError::InvalidToken("Invalid token audience".to_string())
                    }
                    _ => WardenError::InvalidToken(e.to_string()),
                }
            })?
            .claims;

        if claims.token_type != expected {
            warn!("Expected {} token, got {}", expected, claims.token_type);
            return Err(WardenError::InvalidToken(format!("Expected {} token", expected)));
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .finish_non_exhaustive()
    }
}
