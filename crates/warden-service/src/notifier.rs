//! Outgoing password reset notifications.

use async_trait::async_trait;
use tracing::info;
use url::Url;
use warden_config::NotificationConfig;
use warden_core::{WardenError, WardenResult};

/// Delivers password reset links.
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
    /// Address the message is sent from.
    fn sender(&self) -> &str;

    /// Sends the reset link for `token` to `email`.
    async fn send_reset_link(&self, email: &str, token: &str) -> WardenResult<()>;
}

/// Notifier that writes the reset link to the log instead of sending mail.
#[derive(Debug, Clone)]
pub struct LoggingNotifier {
    config: NotificationConfig,
}

impl LoggingNotifier {
    /// Creates a notifier from the notification settings.
    #[must_use]
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    /// Builds the reset link for `token`.
    pub fn reset_link(&self, token: &str) -> WardenResult<Url> {
        let mut url = Url::parse(&self.config.reset_password_url)
            .map_err(|e| WardenError::Configuration(format!("Invalid reset password URL: {}", e)))?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }
}

#[async_trait]
impl PasswordResetNotifier for LoggingNotifier {
    fn sender(&self) -> &str {
        &self.config.email_from
    }

    async fn send_reset_link(&self, email: &str, token: &str) -> WardenResult<()> {
        let link = self.reset_link(token)?;
        info!(to = email, from = %self.config.email_from, link = %link, "Password reset link issued");
        Ok(())
    }
}
