//! Field mapping: raw form fields → normalized `SubmissionRecord`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{PageContext, Recipients};
use crate::form::FormCategory;

pub mod keys {
    pub const NAME: &str = "name";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const ROLE: &str = "role";
    pub const INTEREST: &str = "interest";
    pub const CHALLENGES: &str = "challenges";
    pub const MESSAGE: &str = "message";
    pub const EMAIL: &str = "email";
    pub const COMPANY: &str = "company";
    pub const PHONE: &str = "phone";

    pub const FORM_TYPE: &str = "formType";
    pub const PAGE_URL: &str = "pageUrl";
    pub const PAGE_TITLE: &str = "pageTitle";
    pub const TIMESTAMP: &str = "timestamp";
    pub const CLIENT_AGENT: &str = "clientAgent";
    pub const TO_EMAIL: &str = "toEmail";
}

/// Flat string map sent to the webhook. Keys iterate in sorted order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct SubmissionRecord(BTreeMap<String, String>);

impl SubmissionRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value of `key` when it exists and is non-empty.
    pub fn present(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn form_type(&self) -> &str {
        self.get(keys::FORM_TYPE).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    fn is_absent(&self, key: &str) -> bool {
        self.present(key).is_none()
    }
}

/// Splits on the first space: prefix is the first name, the rest (maybe empty) the last name.
pub fn split_name(name: &str) -> (&str, &str) {
    name.split_once(' ').unwrap_or((name, ""))
}

#[derive(Debug, Clone)]
pub struct FieldMapper {
    page: PageContext,
    recipients: Recipients,
}

impl FieldMapper {
    pub fn new(page: PageContext, recipients: Recipients) -> Self {
        Self { page, recipients }
    }

    pub fn map<I, K, V>(&self, raw: I, category: FormCategory) -> SubmissionRecord
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.map_at(raw, category, Utc::now())
    }

    pub fn map_at<I, K, V>(&self, raw: I, category: FormCategory, now: DateTime<Utc>) -> SubmissionRecord
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = SubmissionRecord(
            raw.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );

        apply_category_defaults(&mut record, category);

        record.set(keys::FORM_TYPE, category.as_str());
        record.set(keys::PAGE_URL, self.page.url.as_str());
        record.set(keys::PAGE_TITLE, self.page.title.as_str());
        record.set(keys::TIMESTAMP, now.to_rfc3339_opts(SecondsFormat::Millis, true));
        record.set(keys::CLIENT_AGENT, self.page.client_agent.as_str());
        record.set(keys::TO_EMAIL, self.recipients.notify_list());
        record
    }
}

fn apply_category_defaults(record: &mut SubmissionRecord, category: FormCategory) {
    if record.is_absent(keys::FIRST_NAME) {
        if let Some(name) = record.present(keys::NAME) {
            let (first, last) = split_name(name);
            let (first, last) = (first.to_string(), last.to_string());
            record.set(keys::FIRST_NAME, first);
            record.set(keys::LAST_NAME, last);
        }
    }

    if record.is_absent(keys::INTEREST) {
        if let Some(challenges) = record.present(keys::CHALLENGES).map(String::from) {
            record.set(keys::INTEREST, challenges);
        }
    }

    if record.is_absent(keys::ROLE) {
        record.set(keys::ROLE, category.default_role());
    }
}
