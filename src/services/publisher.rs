//! Message broker publisher.
//!
//! Account creation announces new accounts on a broker channel so other
//! services (notifications, ledgers) can react. Delivery is at most once:
//! callers spawn the publish and only log failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid broker url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("broker request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("broker rejected message with status {0}")]
    Rejected(StatusCode),
}

/// Sink for outbound broker messages.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish `message` on the configured channel.
    async fn publish(&self, message: String) -> Result<(), PublishError>;
}

/// Body posted to the broker's publish endpoint.
#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    publisher_id: &'a str,
    channel: &'a str,
    msg: String,
}

/// Publishes over HTTP to `<base>/msg/publish`.
///
/// # Timeout
///
/// 5 seconds per message (prevents a slow broker from piling up tasks)
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoint: Url,
    publisher_id: String,
    channel: String,
}

impl HttpPublisher {
    /// Build a publisher for the broker at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Broker root, with or without a path prefix or trailing slash
    /// * `publisher_id` - Identity announced with every message
    /// * `channel` - Channel the messages are published on
    pub fn new(base_url: &str, publisher_id: String, channel: String) -> Result<Self, PublishError> {
        let mut base = Url::parse(base_url)?;
        // `join` replaces the last segment unless the path ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join("msg/publish")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            publisher_id,
            channel,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MessagePublisher for HttpPublisher {
    async fn publish(&self, message: String) -> Result<(), PublishError> {
        let body = PublishRequest {
            publisher_id: &self.publisher_id,
            channel: &self.channel,
            msg: message,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PublishError::Rejected(response.status()));
        }

        tracing::debug!(channel = %self.channel, "published message");
        Ok(())
    }
}
