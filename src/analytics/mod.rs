//! Analytics event sink.
//!
//! Every tracked event becomes one structured `tracing` event under the
//! `nova_forms::analytics` target. When a forwarder is installed (the site's
//! third-party analytics integration) the event is handed to it as well;
//! forwarding failures are logged and swallowed.

pub mod scroll;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

pub use scroll::{section_for, ScrollDepthTracker, PAGE_SECTIONS};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    PageView,
    ScrollDepth,
    CtaClick,
    FormSubmission,
    /// Uncaught runtime error. Keeps the wire name existing dashboards filter on.
    #[serde(rename = "javascript_error")]
    RuntimeError,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::PageView => "page_view",
            EventName::ScrollDepth => "scroll_depth",
            EventName::CtaClick => "cta_click",
            EventName::FormSubmission => "form_submission",
            EventName::RuntimeError => "javascript_error",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type EventParams = Map<String, Value>;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub name: EventName,
    pub params: EventParams,
    pub at: DateTime<Utc>,
}

pub trait AnalyticsForwarder: Send + Sync {
    fn forward(&self, event: &AnalyticsEvent) -> anyhow::Result<()>;
}

/// Where a clicked CTA sits on the page.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CtaPosition {
    pub x: f64,
    pub y: f64,
    pub section: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Success => "success",
            SubmissionStatus::Error => "error",
        }
    }
}

pub struct Analytics {
    page_path: String,
    forwarder: Option<Arc<dyn AnalyticsForwarder>>,
}

impl Analytics {
    pub fn new(page_path: impl Into<String>) -> Self {
        Self {
            page_path: page_path.into(),
            forwarder: None,
        }
    }

    pub fn with_forwarder(mut self, forwarder: Arc<dyn AnalyticsForwarder>) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn page_path(&self) -> &str {
        &self.page_path
    }

    pub fn track(&self, name: EventName, params: EventParams) -> AnalyticsEvent {
        let event = AnalyticsEvent {
            name,
            params,
            at: Utc::now(),
        };

        let logged = Value::Object(event.params.clone());
        info!(
            target: "nova_forms::analytics",
            event = %event.name,
            params = %logged,
            "Analytics event"
        );

        if let Some(forwarder) = &self.forwarder {
            if let Err(e) = forwarder.forward(&event) {
                warn!(event = %event.name, error = %e, "Analytics forwarder rejected event");
            }
        }
        event
    }

    pub fn track_page_view(&self, title: &str, referrer: &str) -> AnalyticsEvent {
        self.track(
            EventName::PageView,
            params(json!({
                "page": self.page_path,
                "title": title,
                "referrer": referrer,
            })),
        )
    }

    pub fn track_scroll_depth(&self, depth: u32) -> AnalyticsEvent {
        self.track(
            EventName::ScrollDepth,
            params(json!({ "depth": depth, "page": self.page_path })),
        )
    }

    pub fn track_cta_click(&self, text: &str, position: &CtaPosition) -> AnalyticsEvent {
        self.track(
            EventName::CtaClick,
            params(json!({
                "text": text.trim(),
                "page": self.page_path,
                "position": position,
            })),
        )
    }

    pub fn track_form_submission(
        &self,
        form_type: &str,
        status: SubmissionStatus,
        error: Option<&str>,
    ) -> AnalyticsEvent {
        let mut p = params(json!({
            "form_type": form_type,
            "page": self.page_path,
            "status": status.as_str(),
        }));
        if let Some(error) = error {
            p.insert("error".to_string(), Value::String(error.to_string()));
        }
        self.track(EventName::FormSubmission, p)
    }

    pub fn report_runtime_error(&self, message: &str, filename: &str, line: u32) -> AnalyticsEvent {
        error!(error_message = message, filename, line, "Runtime error");
        self.track(
            EventName::RuntimeError,
            params(json!({
                "message": message,
                "filename": filename,
                "line": line,
                "page": self.page_path,
            })),
        )
    }

    /// Reports panics as runtime error events, then defers to the previous hook.
    pub fn install_panic_reporter(self: Arc<Self>) {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let (file, line) = info
                .location()
                .map(|l| (l.file().to_string(), l.line()))
                .unwrap_or_default();

            self.report_runtime_error(&message, &file, line);
            previous(info);
        }));
    }
}

fn params(value: Value) -> EventParams {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests;
