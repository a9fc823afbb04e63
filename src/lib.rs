//! # nova_forms
//!
//! Client-side interaction layer of the Nova marketing site, minus the DOM:
//! lead forms are classified at registration, validated, mapped into a flat
//! record and delivered to the lead webhook. When the webhook is unreachable
//! the user's mail client is opened with a pre-filled message instead.
//! Outcomes are shown as transient notifications and tracked as analytics
//! events.
//!
//! ```text
//! Site::submit_form → SubmissionPipeline
//!     validate → FieldMapper → Dispatcher ──webhook──▶ Delivered(Webhook)
//!                                  └──on failure──▶ mailto ─▶ Delivered(MailCompose) | Failed
//!                                                  → Notifier (tray + form_submission event)
//! ```

pub mod analytics;
mod commands;
pub mod config;
pub mod errors;
pub mod form;
pub mod pipeline;

pub use commands::Site;
pub use config::PipelineConfig;
pub use errors::{ConfigError, DeliveryError, FieldError, SubmissionError};
pub use form::{FormCategory, FormIdentity};
pub use pipeline::{DeliveryChannel, DeliveryOutcome, SubmissionRecord};

/// Installs a `fmt` subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::info!("subscriber installed");
    }
}
