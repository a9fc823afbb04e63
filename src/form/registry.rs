//! Registered forms: field values, inline errors and the submit button state.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use super::category::{FormCategory, FormIdentity};
use super::validator::{validate_field, FieldSpec};
use crate::errors::{FieldError, SubmissionError, SubmissionResult};

pub const SENDING_LABEL: &str = "Sending...";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Submit button of one form. Disabled while a submission is in flight.
#[derive(Debug)]
pub struct SubmitButton {
    label: String,
    in_flight: AtomicBool,
}

impl SubmitButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn label(&self) -> &str {
        if self.is_disabled() {
            SENDING_LABEL
        } else {
            &self.label
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { button: self })
    }
}

/// Restores the button when dropped, whatever the outcome.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    button: &'a SubmitButton,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.button.in_flight.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct SiteForm {
    id: String,
    category: FormCategory,
    fields: Vec<FieldSpec>,
    values: Mutex<BTreeMap<String, String>>,
    errors: Mutex<BTreeMap<String, FieldError>>,
    button: SubmitButton,
}

impl SiteForm {
    /// Registers a form, classifying it from its static identity.
    pub fn register(identity: &FormIdentity, fields: Vec<FieldSpec>, button_label: &str) -> Self {
        let category = identity.classify();
        let id = identity
            .id
            .clone()
            .unwrap_or_else(|| format!("{}-form", category.as_str()));
        Self::with_category(id, category, fields, button_label)
    }

    pub fn with_category(
        id: impl Into<String>,
        category: FormCategory,
        fields: Vec<FieldSpec>,
        button_label: &str,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            fields,
            values: Mutex::new(BTreeMap::new()),
            errors: Mutex::new(BTreeMap::new()),
            button: SubmitButton::new(button_label),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> FormCategory {
        self.category
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn button(&self) -> &SubmitButton {
        &self.button
    }

    /// Typing into a field clears its inline error.
    pub fn input(&self, name: &str, value: impl Into<String>) {
        lock(&self.values).insert(name.to_string(), value.into());
        lock(&self.errors).remove(name);
    }

    /// Validates one field on blur and records or clears its inline error.
    pub fn blur(&self, name: &str) -> Result<(), FieldError> {
        let Some(spec) = self.fields.iter().find(|f| f.name == name) else {
            return Ok(());
        };
        let value = lock(&self.values).get(name).cloned();
        let result = validate_field(spec, value.as_deref());

        let mut errors = lock(&self.errors);
        match &result {
            Ok(()) => {
                errors.remove(name);
            }
            Err(e) => {
                debug!(form = %self.id, field = name, error = %e, "Field failed validation");
                errors.insert(name.to_string(), e.clone());
            }
        }
        result
    }

    pub fn field_error(&self, name: &str) -> Option<FieldError> {
        lock(&self.errors).get(name).cloned()
    }

    /// Validates every declared field, recording inline errors.
    pub fn validate_all(&self) -> SubmissionResult<()> {
        let failures: Vec<(String, FieldError)> = self
            .fields
            .iter()
            .filter_map(|spec| self.blur(&spec.name).err().map(|e| (spec.name.clone(), e)))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SubmissionError::Validation(failures))
        }
    }

    pub fn values(&self) -> BTreeMap<String, String> {
        lock(&self.values).clone()
    }

    pub fn reset(&self) {
        lock(&self.values).clear();
        lock(&self.errors).clear();
    }

    /// Disables the submit button for the lifetime of the returned guard.
    pub fn begin_submission(&self) -> SubmissionResult<InFlightGuard<'_>> {
        self.button.try_begin().ok_or_else(|| SubmissionError::InFlight {
            form_id: self.id.clone(),
        })
    }
}

/// All forms on the page, keyed by id. Categories are fixed at registration.
#[derive(Debug, Default)]
pub struct FormRegistry {
    forms: HashMap<String, Arc<SiteForm>>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `form`, suffixing its id (`-2`, `-3`, ...) if the id is taken.
    pub fn register(&mut self, mut form: SiteForm) -> Arc<SiteForm> {
        if self.forms.contains_key(&form.id) {
            let base = form.id.clone();
            let mut n = 2;
            while self.forms.contains_key(&format!("{}-{}", base, n)) {
                n += 1;
            }
            form.id = format!("{}-{}", base, n);
            warn!(requested = %base, assigned = %form.id, "Duplicate form id");
        }
        let form = Arc::new(form);
        debug!(form = %form.id(), category = %form.category(), "Form registered");
        self.forms.insert(form.id().to_string(), Arc::clone(&form));
        form
    }

    pub fn get(&self, id: &str) -> Option<Arc<SiteForm>> {
        self.forms.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}
