//! Pipeline configuration: webhook endpoint, recipients, fallback timing, page context.
//!
//! Loaded once at startup from built-in defaults, an optional TOML file and
//! `NOVA_*` environment overrides (a `.env` file is honoured via `dotenv`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::errors::{ConfigError, ConfigResult};

pub const DEFAULT_WEBHOOK_URL: &str = "https://prod-00.northcentralus.logic.azure.com:443/workflows/3d664181d2b548df9e1795e0136e2310/triggers/When_an_HTTP_request_is_received/paths/invoke?api-version=2016-10-01&sp=%2Ftriggers%2FWhen_an_HTTP_request_is_received%2Frun&sv=1.0&sig=1Cy8mliRVbaGOoE3c1DK0PEv3bOYKtHrXnq5lM73NoY";
pub const DEFAULT_PRIMARY_RECIPIENT: &str = "ludovic.petit@exeevo.com";
pub const DEFAULT_NOTIFY_RECIPIENTS: [&str; 2] = ["ludovic.petit@exeevo.com", "paven.rai@exeevo.com"];

pub const ENV_WEBHOOK_URL: &str = "NOVA_WEBHOOK_URL";
pub const ENV_PRIMARY_RECIPIENT: &str = "NOVA_PRIMARY_RECIPIENT";
pub const ENV_NOTIFY_RECIPIENTS: &str = "NOVA_NOTIFY_RECIPIENTS";
pub const ENV_FALLBACK_DELAY_MS: &str = "NOVA_FALLBACK_DELAY_MS";
pub const ENV_NOTIFICATION_TTL_MS: &str = "NOVA_NOTIFICATION_TTL_MS";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub webhook: WebhookConfig,
    pub recipients: Recipients,
    pub delivery: DeliveryConfig,
    pub notifications: NotificationConfig,
    pub page: PageContext,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    /// Per-request timeout. `None` leaves it to the transport.
    pub request_timeout_ms: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Recipients {
    /// Address used by the mail-compose fallback.
    pub primary: String,
    /// Addresses stamped into every record as `toEmail`.
    pub notify: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DeliveryConfig {
    /// How long the fallback waits after opening the mail client before reporting success.
    pub fallback_settle_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub ttl_ms: u64,
}

/// Where the form lives. Stamped into every record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub client_agent: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBHOOK_URL.to_string(),
            request_timeout_ms: None,
        }
    }
}

impl Default for Recipients {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_RECIPIENT.to_string(),
            notify: DEFAULT_NOTIFY_RECIPIENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self { fallback_settle_ms: 1000 }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { ttl_ms: 5000 }
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            url: "https://ask-nova.com/".to_string(),
            title: "Ask-Nova".to_string(),
            client_agent: format!("nova_forms/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PageContext {
    /// Path component of the page URL, used as the `page` analytics parameter.
    pub fn path(&self) -> String {
        Url::parse(&self.url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| "/".to_string())
    }
}

impl Recipients {
    pub fn notify_list(&self) -> String {
        self.notify.join(", ")
    }
}

impl DeliveryConfig {
    pub fn fallback_settle(&self) -> Duration {
        Duration::from_millis(self.fallback_settle_ms)
    }
}

impl NotificationConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl PipelineConfig {
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Defaults, then the optional file, then `.env` / process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            webhook_host = %config.webhook_host(),
            primary = %config.recipients.primary,
            "Pipeline configuration loaded"
        );
        Ok(config)
    }

    /// Applies `NOVA_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_WEBHOOK_URL) {
            debug!(var = ENV_WEBHOOK_URL, "Overriding webhook url");
            self.webhook.url = url;
        }
        if let Some(primary) = lookup(ENV_PRIMARY_RECIPIENT) {
            self.recipients.primary = primary.trim().to_string();
        }
        if let Some(list) = lookup(ENV_NOTIFY_RECIPIENTS) {
            self.recipients.notify = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(ms) = lookup(ENV_FALLBACK_DELAY_MS) {
            self.delivery.fallback_settle_ms = parse_millis(ENV_FALLBACK_DELAY_MS, &ms)?;
        }
        if let Some(ms) = lookup(ENV_NOTIFICATION_TTL_MS) {
            self.notifications.ttl_ms = parse_millis(ENV_NOTIFICATION_TTL_MS, &ms)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.webhook_url()?;

        if !looks_like_address(&self.recipients.primary) {
            return Err(ConfigError::InvalidRecipient {
                address: self.recipients.primary.clone(),
            });
        }
        if self.recipients.notify.is_empty() {
            return Err(ConfigError::MissingRecipients);
        }
        if let Some(bad) = self.recipients.notify.iter().find(|a| !looks_like_address(a)) {
            return Err(ConfigError::InvalidRecipient { address: bad.clone() });
        }
        Ok(())
    }

    pub fn webhook_url(&self) -> ConfigResult<Url> {
        let url = Url::parse(&self.webhook.url).map_err(|e| ConfigError::InvalidWebhookUrl {
            url: self.webhook.url.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidWebhookUrl {
                url: self.webhook.url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    // The signed query string is a credential; only the host goes to the logs.
    fn webhook_host(&self) -> String {
        self.webhook_url()
            .ok()
            .and_then(|u| u.host_str().map(String::from))
            .unwrap_or_default()
    }
}

fn parse_millis(var: &str, raw: &str) -> ConfigResult<u64> {
    raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: raw.to_string(),
    })
}

fn looks_like_address(address: &str) -> bool {
    crate::form::validator::is_valid_email(address)
}
