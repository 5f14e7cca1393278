use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::CaptchaConfig;

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,

    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifies reCAPTCHA response tokens against the siteverify endpoint.
#[derive(Clone)]
pub struct CaptchaClient {
    client: Client,
    config: CaptchaConfig,
}

impl CaptchaClient {
    #[must_use]
    pub const fn new(client: Client, config: CaptchaConfig) -> Self {
        Self { client, config }
    }

    /// Returns whether the token passes the human check. With the check
    /// disabled in config every token is accepted.
    pub async fn verify(&self, token: &str) -> Result<bool> {
        if !self.config.enabled {
            return Ok(true);
        }

        if token.is_empty() {
            return Ok(false);
        }

        let response = self
            .client
            .post(&self.config.verify_url)
            .form(&[("secret", self.config.secret.as_str()), ("response", token)])
            .send()
            .await
            .context("Captcha verification request failed")?;

        let body: SiteVerifyResponse = response
            .json()
            .await
            .context("Failed to parse captcha verification response")?;

        if !body.success && !body.error_codes.is_empty() {
            warn!("Captcha verification rejected: {:?}", body.error_codes);
        }

        Ok(body.success)
    }
}
