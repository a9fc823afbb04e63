//! Delivery: one webhook POST, then at most one mail-compose fallback.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::mailto;
use super::mapper::SubmissionRecord;
use crate::config::PipelineConfig;
use crate::errors::{ConfigError, ConfigResult, DeliveryError, DeliveryResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// POST `record` as JSON. Non-2xx statuses are returned, not raised.
    async fn post_json(&self, url: &Url, record: &SubmissionRecord) -> DeliveryResult<WebhookResponse>;
}

pub trait MailComposer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Hands a `mailto:` URI to whatever composes mail on this machine.
    fn open(&self, uri: &str) -> DeliveryResult<()>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> ConfigResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::HttpClient {
            reason: e.to_string(),
        })?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn post_json(&self, url: &Url, record: &SubmissionRecord) -> DeliveryResult<WebhookResponse> {
        let payload = serde_json::to_vec(record)?;

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                // The signed query string must never reach the logs.
                reason: if e.is_timeout() {
                    "Request timeout - the webhook took too long to respond".to_string()
                } else if e.is_connect() {
                    "Connection error - unable to reach the webhook".to_string()
                } else {
                    e.without_url().to_string()
                },
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| DeliveryError::Transport {
            reason: format!("Failed to read response body: {}", e.without_url()),
        })?;

        Ok(WebhookResponse { status, body })
    }
}

/// Opens `mailto:` links with the desktop's registered handler, without
/// waiting for the handler to exit.
pub struct SystemMailComposer;

impl MailComposer for SystemMailComposer {
    fn name(&self) -> &'static str {
        "system"
    }

    fn open(&self, uri: &str) -> DeliveryResult<()> {
        open::that_detached(uri).map_err(|e| DeliveryError::MailCompose {
            reason: e.to_string(),
        })
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// Accepted by the webhook.
    Webhook,
    /// Mail client opened; nobody knows whether the user pressed send.
    MailCompose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(DeliveryChannel),
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }

    /// Only webhook deliveries are confirmed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(DeliveryChannel::Webhook))
    }
}

pub struct Dispatcher {
    webhook: Url,
    recipient: String,
    settle: Duration,
    transport: Arc<dyn WebhookTransport>,
    composer: Arc<dyn MailComposer>,
}

impl Dispatcher {
    pub fn new(config: &PipelineConfig) -> ConfigResult<Self> {
        let timeout = config.webhook.request_timeout_ms.map(Duration::from_millis);
        Self::with_parts(
            config,
            Arc::new(ReqwestTransport::new(timeout)?),
            Arc::new(SystemMailComposer),
        )
    }

    pub fn with_parts(
        config: &PipelineConfig,
        transport: Arc<dyn WebhookTransport>,
        composer: Arc<dyn MailComposer>,
    ) -> ConfigResult<Self> {
        Ok(Self {
            webhook: config.webhook_url()?,
            recipient: config.recipients.primary.clone(),
            settle: config.delivery.fallback_settle(),
            transport,
            composer,
        })
    }

    #[instrument(skip(self, record), fields(form_type = record.form_type()))]
    pub async fn dispatch(&self, record: &SubmissionRecord) -> DeliveryOutcome {
        match self.deliver_webhook(record).await {
            Ok(()) => {
                info!(transport = self.transport.name(), "Webhook accepted submission");
                return DeliveryOutcome::Delivered(DeliveryChannel::Webhook);
            }
            Err(e) => {
                warn!(error = %e, "Webhook delivery failed, using mail-compose fallback");
            }
        }

        match self.deliver_mail_compose(record).await {
            Ok(()) => DeliveryOutcome::Delivered(DeliveryChannel::MailCompose),
            Err(e) => {
                error!(composer = self.composer.name(), error = %e, "Mail-compose fallback failed");
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }

    async fn deliver_webhook(&self, record: &SubmissionRecord) -> DeliveryResult<()> {
        let response = self.transport.post_json(&self.webhook, record).await?;
        debug!(status = response.status, "Webhook responded");

        if !response.is_success() {
            return Err(DeliveryError::Status {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str::<serde_json::Value>(&response.body).map_err(|e| {
            DeliveryError::MalformedResponse {
                reason: e.to_string(),
            }
        })?;
        Ok(())
    }

    async fn deliver_mail_compose(&self, record: &SubmissionRecord) -> DeliveryResult<()> {
        let uri = mailto::compose(&self.recipient, record);
        let composer = Arc::clone(&self.composer);
        tokio::task::spawn_blocking(move || composer.open(&uri))
            .await
            .map_err(|e| DeliveryError::MailCompose {
                reason: format!("Mail client task failed: {}", e),
            })??;
        debug!(composer = self.composer.name(), "Mail client opened");

        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}
