//! Page-level entry points: one method per browser event the site reacts to.

use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

use crate::analytics::{section_for, Analytics, AnalyticsForwarder, CtaPosition, ScrollDepthTracker};
use crate::config::PipelineConfig;
use crate::errors::{ConfigResult, FieldError, SubmissionError, SubmissionResult};
use crate::form::{FieldSpec, FormIdentity, FormRegistry, SiteForm};
use crate::pipeline::{
    DeliveryOutcome, Dispatcher, FieldMapper, MailComposer, Notification, NotificationTray, Notifier,
    SubmissionPipeline, WebhookTransport,
};

pub struct Site {
    config: PipelineConfig,
    registry: FormRegistry,
    pipeline: SubmissionPipeline,
    analytics: Arc<Analytics>,
    scroll: Mutex<ScrollDepthTracker>,
}

impl Site {
    /// Wires the pipeline with the HTTP webhook transport and the system mail client.
    pub fn from_config(config: PipelineConfig) -> ConfigResult<Self> {
        let dispatcher = Dispatcher::new(&config)?;
        Ok(Self::assemble(config, dispatcher, None))
    }

    pub fn with_parts(
        config: PipelineConfig,
        transport: Arc<dyn WebhookTransport>,
        composer: Arc<dyn MailComposer>,
        forwarder: Option<Arc<dyn AnalyticsForwarder>>,
    ) -> ConfigResult<Self> {
        let dispatcher = Dispatcher::with_parts(&config, transport, composer)?;
        Ok(Self::assemble(config, dispatcher, forwarder))
    }

    fn assemble(
        config: PipelineConfig,
        dispatcher: Dispatcher,
        forwarder: Option<Arc<dyn AnalyticsForwarder>>,
    ) -> Self {
        let mut analytics = Analytics::new(config.page.path());
        if let Some(forwarder) = forwarder {
            analytics = analytics.with_forwarder(forwarder);
        }
        let analytics = Arc::new(analytics);

        let tray = Arc::new(NotificationTray::new(config.notifications.ttl()));
        let mapper = FieldMapper::new(config.page.clone(), config.recipients.clone());
        let notifier = Notifier::new(tray, Arc::clone(&analytics));

        Self {
            pipeline: SubmissionPipeline::new(mapper, dispatcher, notifier),
            registry: FormRegistry::new(),
            scroll: Mutex::new(ScrollDepthTracker::new()),
            analytics,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn analytics(&self) -> &Arc<Analytics> {
        &self.analytics
    }

    /* ---------- forms ---------- */

    pub fn register_form(&mut self, identity: &FormIdentity, fields: Vec<FieldSpec>, button_label: &str) -> Arc<SiteForm> {
        self.registry
            .register(SiteForm::register(identity, fields, button_label))
    }

    pub fn form(&self, id: &str) -> Option<Arc<SiteForm>> {
        self.registry.get(id)
    }

    fn require_form(&self, id: &str) -> SubmissionResult<Arc<SiteForm>> {
        self.form(id).ok_or_else(|| SubmissionError::UnknownForm {
            form_id: id.to_string(),
        })
    }

    pub fn field_input(&self, form_id: &str, field: &str, value: &str) -> SubmissionResult<()> {
        self.require_form(form_id)?.input(field, value);
        Ok(())
    }

    pub fn field_blur(&self, form_id: &str, field: &str) -> SubmissionResult<Result<(), FieldError>> {
        Ok(self.require_form(form_id)?.blur(field))
    }

    pub async fn submit_form(&self, form_id: &str) -> SubmissionResult<DeliveryOutcome> {
        let form = self.require_form(form_id)?;
        self.pipeline.submit(&form).await
    }

    /* ---------- notifications ---------- */

    pub fn notifications(&self) -> Vec<Notification> {
        self.pipeline.notifier().tray().active()
    }

    pub fn dismiss_notification(&self, id: Uuid) -> bool {
        self.pipeline.notifier().tray().dismiss(id)
    }

    /* ---------- analytics ---------- */

    pub fn page_loaded(&self, referrer: &str) {
        self.analytics.track_page_view(&self.config.page.title, referrer);
    }

    /// Returns the scroll milestones reported by this call.
    pub fn page_scrolled(&self, scroll_y: f64, document_height: f64, viewport_height: f64) -> Vec<u32> {
        let milestones = self
            .scroll
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(scroll_y, document_height, viewport_height);
        for depth in &milestones {
            self.analytics.track_scroll_depth(*depth);
        }
        milestones
    }

    /// `ancestors` are the ids and class names enclosing the clicked element.
    pub fn cta_clicked<'a, I>(&self, text: &str, x: f64, y: f64, ancestors: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let position = CtaPosition {
            x,
            y,
            section: section_for(ancestors).to_string(),
        };
        self.analytics.track_cta_click(text, &position);
    }

    pub fn install_error_reporter(&self) {
        Arc::clone(&self.analytics).install_panic_reporter();
    }
}
