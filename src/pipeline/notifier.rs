//! Outcome reporting: transient notifications plus a `form_submission` event.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

use super::dispatcher::DeliveryOutcome;
use crate::analytics::{Analytics, SubmissionStatus};
use crate::form::SiteForm;

pub const SUCCESS_MESSAGE: &str = "Thank you! We will get back to you within 24 hours.";
pub const ERROR_MESSAGE: &str =
    "Sorry, there was an error sending your request. Please try again or contact us directly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Stack of visible notifications. New ones never replace old ones.
#[derive(Debug)]
pub struct NotificationTray {
    ttl: Duration,
    items: Mutex<Vec<Notification>>,
}

impl NotificationTray {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            items: Mutex::new(Vec::new()),
        }
    }

    fn items(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        let now = Instant::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            expires_at: now + self.ttl,
        };
        let id = notification.id;

        let mut items = self.items();
        items.retain(|n| !n.is_expired(now));
        items.push(notification);
        id
    }

    /// Stored notifications, including expired ones not yet pruned.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Explicit close. Returns whether the notification was still showing.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut items = self.items();
        let before = items.len();
        items.retain(|n| n.id != id);
        items.len() != before
    }

    /// Visible notifications, oldest first. Expired ones are dropped here.
    pub fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut items = self.items();
        items.retain(|n| !n.is_expired(now));
        items.clone()
    }
}

pub struct Notifier {
    tray: Arc<NotificationTray>,
    analytics: Arc<Analytics>,
}

impl Notifier {
    pub fn new(tray: Arc<NotificationTray>, analytics: Arc<Analytics>) -> Self {
        Self { tray, analytics }
    }

    pub fn tray(&self) -> &Arc<NotificationTray> {
        &self.tray
    }

    pub fn notify(&self, outcome: &DeliveryOutcome, form: &SiteForm) -> Uuid {
        let form_type = form.category().as_str();
        match outcome {
            DeliveryOutcome::Delivered(channel) => {
                debug!(form = form.id(), ?channel, "Submission delivered, resetting form");
                form.reset();
                self.analytics
                    .track_form_submission(form_type, SubmissionStatus::Success, None);
                self.tray.push(NotificationKind::Success, SUCCESS_MESSAGE)
            }
            DeliveryOutcome::Failed(reason) => {
                self.analytics
                    .track_form_submission(form_type, SubmissionStatus::Error, Some(reason.as_str()));
                self.tray.push(NotificationKind::Error, ERROR_MESSAGE)
            }
        }
    }
}
