//! Transactional email: verification and password-reset flows backed by
//! single-use expiring tokens, delivered over SMTP.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::{MailConfig, SecurityConfig};
use crate::constants::email_token;
use crate::db::Store;
use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for MailError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Generate a random token for email links (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

pub struct MailService {
    store: Store,
    config: MailConfig,
    security: SecurityConfig,
}

impl MailService {
    #[must_use]
    pub const fn new(store: Store, config: MailConfig, security: SecurityConfig) -> Self {
        Self {
            store,
            config,
            security,
        }
    }

    /// Delivers over SMTP, or logs the mail when delivery is disabled so
    /// development setups can complete the flows.
    async fn deliver(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        if !self.config.enabled {
            info!("Mail disabled; would send to {}: {}", to, subject);
            return Ok(());
        }

        let message = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| MailError::Transport(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailError::Transport(format!("Invalid recipient: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }

    async fn issue_token(&self, user_id: UserId, purpose: &str) -> Result<String, MailError> {
        let token = generate_token();
        let expires_at =
            (chrono::Utc::now() + chrono::Duration::hours(email_token::TTL_HOURS)).to_rfc3339();

        self.store
            .issue_email_token(user_id, &token, purpose, &expires_at)
            .await?;

        Ok(token)
    }

    pub async fn send_verification(&self, user_id: UserId) -> Result<(), MailError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(MailError::UserNotFound(user_id))?;

        let token = self.issue_token(user_id, email_token::VERIFY_PURPOSE).await?;
        let link = format!(
            "{}/verifiser-epost?token={token}",
            self.config.frontend_base_url
        );

        let body = format!(
            "Hei {},\n\nBekreft e-postadressen din ved å åpne lenken:\n{link}\n\n\
             Lenken er gyldig i {} timer.",
            user.first_name,
            email_token::TTL_HOURS
        );

        self.deliver(&user.email, "Bekreft e-postadressen din", body)
            .await
    }

    pub async fn send_password_reset(&self, user_id: UserId) -> Result<(), MailError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(MailError::UserNotFound(user_id))?;

        let token = self.issue_token(user_id, email_token::RESET_PURPOSE).await?;
        let link = format!(
            "{}/nullstill-passord?token={token}",
            self.config.frontend_base_url
        );

        let body = format!(
            "Hei {},\n\nDu kan velge nytt passord ved å åpne lenken:\n{link}\n\n\
             Lenken er gyldig i {} timer. Ignorer denne e-posten om du ikke ba om den.",
            user.first_name,
            email_token::TTL_HOURS
        );

        self.deliver(&user.email, "Nullstill passordet ditt", body)
            .await
    }

    pub async fn send_test(&self, to: &str) -> Result<(), MailError> {
        self.deliver(
            to,
            "Testmelding",
            "Dette er en testmelding fra beredt. Oppsettet fungerer.".to_string(),
        )
        .await
    }

    /// Completes a verification or reset flow. Reset requires the new
    /// password; tokens are consumed on success.
    pub async fn confirm(
        &self,
        token: &str,
        new_password: Option<&str>,
    ) -> Result<(), MailError> {
        let row = self
            .store
            .find_email_token(token)
            .await?
            .ok_or(MailError::InvalidToken)?;

        let expired = chrono::DateTime::parse_from_rfc3339(&row.expires_at)
            .map_or(true, |dt| dt.to_utc() < chrono::Utc::now());
        if expired {
            self.store.consume_email_token(row.id).await?;
            return Err(MailError::InvalidToken);
        }

        match row.purpose.as_str() {
            p if p == email_token::VERIFY_PURPOSE => {
                self.store.set_user_email_verified(row.user_id, true).await?;
            }
            p if p == email_token::RESET_PURPOSE => {
                let password = new_password.ok_or_else(|| {
                    MailError::Validation("New password is required".to_string())
                })?;

                if password.len() < 8 {
                    return Err(MailError::Validation(
                        "Password must be at least 8 characters".to_string(),
                    ));
                }

                self.store
                    .update_user_password(row.user_id, password, &self.security)
                    .await?;
            }
            other => {
                return Err(MailError::Validation(format!(
                    "Unknown token purpose: {other}"
                )));
            }
        }

        self.store.consume_email_token(row.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
