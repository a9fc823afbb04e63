//! # Form submission pipeline
//!
//! ```text
//! SiteForm → validate → FieldMapper → Dispatcher (webhook, else mailto) → Notifier
//! ```
//!
//! One invocation per submit. Nothing is kept between invocations except the
//! form's in-flight flag, which is released when the dispatcher settles.

pub mod dispatcher;
pub mod mailto;
pub mod mapper;
pub mod notifier;

pub use dispatcher::{
    DeliveryChannel, DeliveryOutcome, Dispatcher, MailComposer, ReqwestTransport, SystemMailComposer,
    WebhookResponse, WebhookTransport,
};
pub use mapper::{split_name, FieldMapper, SubmissionRecord};
pub use notifier::{Notification, NotificationKind, NotificationTray, Notifier};

use tracing::{info, instrument};

use crate::errors::SubmissionResult;
use crate::form::SiteForm;

pub struct SubmissionPipeline {
    mapper: FieldMapper,
    dispatcher: Dispatcher,
    notifier: Notifier,
}

impl SubmissionPipeline {
    pub fn new(mapper: FieldMapper, dispatcher: Dispatcher, notifier: Notifier) -> Self {
        Self {
            mapper,
            dispatcher,
            notifier,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Runs one submission of `form`.
    ///
    /// Rejected without dispatching when the form is already in flight or any
    /// field fails validation. Otherwise always yields an outcome, which has
    /// already been reported to the user and the event log.
    #[instrument(skip(self, form), fields(form = form.id(), category = %form.category()))]
    pub async fn submit(&self, form: &SiteForm) -> SubmissionResult<DeliveryOutcome> {
        let in_flight = form.begin_submission()?;
        form.validate_all()?;

        let record = self.mapper.map(form.values(), form.category());
        let outcome = self.dispatcher.dispatch(&record).await;
        drop(in_flight);

        self.notifier.notify(&outcome, form);
        info!(
            delivered = outcome.is_delivered(),
            confirmed = outcome.is_confirmed(),
            "Submission settled"
        );
        Ok(outcome)
    }
}
