//! Error taxonomy for configuration, delivery, validation and submission.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("Invalid webhook url '{url}': {reason}")]
    InvalidWebhookUrl { url: String, reason: String },

    #[error("Invalid recipient address: {address}")]
    InvalidRecipient { address: String },

    #[error("At least one notify recipient is required")]
    MissingRecipients,

    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("Failed to create HTTP client: {reason}")]
    HttpClient { reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures on either delivery path.
///
/// `Transport`, `Status` and `MalformedResponse` are network failures and are
/// always recovered by the mail-compose fallback. `MailCompose` is final.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Network error: {reason}")]
    Transport { reason: String },

    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed webhook response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Failed to serialize submission: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Could not open mail client: {reason}")]
    MailCompose { reason: String },
}

impl DeliveryError {
    pub fn is_network_failure(&self) -> bool {
        !matches!(self, DeliveryError::MailCompose { .. })
    }
}

pub type DeliveryResult<T> = Result<T, DeliveryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("A submission for form '{form_id}' is already in flight")]
    InFlight { form_id: String },

    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<(String, FieldError)>),

    #[error("No form registered with id '{form_id}'")]
    UnknownForm { form_id: String },
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_failures_are_recoverable() {
        assert!(DeliveryError::Transport { reason: "refused".into() }.is_network_failure());
        assert!(DeliveryError::Status { status: 500, body: String::new() }.is_network_failure());
        assert!(!DeliveryError::MailCompose { reason: "no handler".into() }.is_network_failure());
    }

    #[test]
    fn validation_message_counts_fields() {
        let err = SubmissionError::Validation(vec![
            ("email".into(), FieldError::InvalidEmail),
            ("name".into(), FieldError::Required),
        ]);
        assert_eq!(err.to_string(), "2 field(s) failed validation");
    }
}
