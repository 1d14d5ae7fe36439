//! Zulip notification adapter
//!
//! This module sends short status messages to a Zulip stream. Notifications
//! are best-effort throughout the pipeline, so callers log delivery failures
//! instead of aborting on them.

use crate::config::ZulipConfig;
use crate::domain::{CanopyError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Outbound notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a plain-text notification
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Notifier that posts to a Zulip stream
///
/// Uses the Zulip REST API with Basic authentication (bot email and API
/// key), posting to the configured stream and topic.
pub struct ZulipNotifier {
    /// Base URL without a trailing slash
    base_url: String,

    /// HTTP client for making requests
    client: Client,

    /// Zulip configuration
    config: ZulipConfig,
}

impl ZulipNotifier {
    /// Create a new notifier from configuration
    pub fn new(config: ZulipConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url,
            client,
            config,
        }
    }

    fn auth_header_value(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.config.email,
            self.config.api_key.expose_secret()
        );
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {encoded}")
    }
}

#[async_trait]
impl Notifier for ZulipNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let url = format!("{}/api/v1/messages", self.base_url);

        let form = [
            ("type", "stream"),
            ("to", self.config.stream.as_str()),
            ("topic", self.config.topic.as_str()),
            ("content", text),
        ];

        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header_value())
            .form(&form)
            .send()
            .await
            .map_err(|e| CanopyError::Notification(format!("Failed to reach Zulip: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CanopyError::Notification(format!(
                "Zulip rejected message with status {status}: {body}"
            )));
        }

        tracing::debug!(
            stream = %self.config.stream,
            topic = %self.config.topic,
            "Notification sent to Zulip"
        );

        Ok(())
    }
}

/// Notifier used when no Zulip section is configured
///
/// Logs the message at debug level and succeeds.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        tracing::debug!(text = %text, "Notification channel not configured, dropping message");
        Ok(())
    }
}
