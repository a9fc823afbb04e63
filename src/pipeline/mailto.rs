//! Mail-compose fallback message: subject, plain-text body and `mailto:` URI.

use super::mapper::{keys, SubmissionRecord};
use crate::form::FormCategory;

const NOT_PROVIDED: &str = "Not provided";

/// Optional per-form fields, listed only when present.
const FORM_SPECIFIC_FIELDS: [(&str, &str); 6] = [
    ("customerType", "Customer Type"),
    ("pharmacyType", "Pharmacy Type"),
    ("accountType", "Account Type"),
    ("deviceCategory", "Device Category"),
    ("therapeuticArea", "Therapeutic Area"),
    ("territory", "Territory"),
];

pub fn subject(record: &SubmissionRecord) -> String {
    format!(
        "Nova Demo Request - {} - {}",
        record.form_type().to_uppercase(),
        record.present(keys::FIRST_NAME).unwrap_or("New Lead")
    )
}

fn form_type_label(record: &SubmissionRecord) -> String {
    record
        .form_type()
        .parse::<FormCategory>()
        .map(|c| c.display_name().to_string())
        .unwrap_or_else(|_| record.form_type().to_string())
}

pub fn body(record: &SubmissionRecord) -> String {
    let or_missing = |key: &str| record.present(key).unwrap_or(NOT_PROVIDED);
    let label = form_type_label(record);

    let specific: String = FORM_SPECIFIC_FIELDS
        .iter()
        .filter_map(|(key, title)| record.present(key).map(|v| format!("- {}: {}\n", title, v)))
        .collect();
    let specific = if specific.is_empty() {
        specific
    } else {
        format!("Form-Specific Information:\n{}\n", specific)
    };

    let first_name = record
        .present(keys::FIRST_NAME)
        .or_else(|| record.present(keys::NAME))
        .unwrap_or("");
    let message = record
        .present(keys::INTEREST)
        .or_else(|| record.present(keys::MESSAGE))
        .or_else(|| record.present(keys::CHALLENGES))
        .unwrap_or("No additional message provided");

    format!(
        "New Nova Demo Request - {label}\n\n\
         Contact Information:\n\
         - Name: {first} {last}\n\
         - Email: {email}\n\
         - Company: {company}\n\
         - Role: {role}\n\
         - Phone: {phone}\n\n\
         {specific}\
         Message/Interest/Challenges:\n\
         {message}\n\n\
         Request Details:\n\
         - Form Type: {label}\n\
         - Page: {page}\n\
         - URL: {url}\n\
         - Timestamp: {timestamp}\n\
         - Client Agent: {agent}\n\n\
         Please follow up with this lead within 24 hours.\n",
        label = label,
        first = first_name,
        last = record.present(keys::LAST_NAME).unwrap_or(""),
        email = or_missing(keys::EMAIL),
        company = or_missing(keys::COMPANY),
        role = or_missing(keys::ROLE),
        phone = or_missing(keys::PHONE),
        specific = specific,
        message = message,
        page = record.get(keys::PAGE_TITLE).unwrap_or_default(),
        url = record.get(keys::PAGE_URL).unwrap_or_default(),
        timestamp = record.get(keys::TIMESTAMP).unwrap_or_default(),
        agent = record.get(keys::CLIENT_AGENT).unwrap_or_default(),
    )
}

/// `mailto:` URI with component-encoded subject and body.
pub fn mailto_uri(recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        recipient,
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

pub fn compose(recipient: &str, record: &SubmissionRecord) -> String {
    mailto_uri(recipient, &subject(record), &body(record))
}
