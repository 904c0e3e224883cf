//! Contact form submission.
//!
//! Validates a visitor's message and appends it to the
//! `Contact Form Submissions` table. The write is attempted exactly once; a
//! duplicate row is worse than asking the visitor to try again.
//!
//! Visitors only ever see one of four fixed messages. Store failures are
//! logged with their detail and reported to the visitor as a generic failure
//! with the church phone number.

use crate::store::{Fields, RecordStore, Table};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub const SUCCESS_MESSAGE: &str =
    "Thank you! We've received your message and will get back to you soon.";

/// Fields posted by the contact form, either urlencoded or JSON.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field")]
    MissingField,
    #[error("invalid email")]
    InvalidEmail,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("submission failed")]
    SubmissionFailed,
}

impl ContactError {
    /// The sentence shown to the visitor.
    pub fn user_message(&self, phone: &str) -> String {
        match self {
            ContactError::Validation(ValidationError::MissingField) => {
                "Please fill in all required fields.".to_string()
            }
            ContactError::Validation(ValidationError::InvalidEmail) => {
                "Please enter a valid email address.".to_string()
            }
            ContactError::SubmissionFailed => format!(
                "Something went wrong. Please try again or call us directly at {phone}."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub record_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// A form that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate(form: &ContactForm) -> Result<ValidForm, ValidationError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let message = form.message.trim();
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(ValidForm {
        name: name.to_string(),
        email: email.to_string(),
        phone: form.phone.as_deref().map(str::trim).unwrap_or("").to_string(),
        message: message.to_string(),
    })
}

/// Store fields for one submission. `Followed Up` always starts false.
pub fn submission_fields(form: &ValidForm, submitted_at: DateTime<Utc>) -> Fields {
    let mut fields = Fields::new();
    fields.insert("Name".into(), Value::String(form.name.clone()));
    fields.insert("Email".into(), Value::String(form.email.clone()));
    fields.insert("Phone".into(), Value::String(form.phone.clone()));
    fields.insert("Message".into(), Value::String(form.message.clone()));
    fields.insert(
        "Date Submitted".into(),
        Value::String(submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    fields.insert("Followed Up".into(), Value::Bool(false));
    fields
}

/// Validate and record one contact submission.
///
/// `store` is `None` when the site runs without credentials; valid
/// submissions then fail like any other write failure.
pub async fn submit(
    store: Option<&dyn RecordStore>,
    form: &ContactForm,
    submitted_at: DateTime<Utc>,
) -> Result<SubmissionReceipt, ContactError> {
    let valid = validate(form)?;

    let Some(store) = store else {
        tracing::error!("contact submission dropped: store not configured");
        return Err(ContactError::SubmissionFailed);
    };

    match store
        .create(Table::ContactSubmissions, submission_fields(&valid, submitted_at))
        .await
    {
        Ok(record) => {
            tracing::info!(record_id = %record.id, "contact submission recorded");
            Ok(SubmissionReceipt {
                record_id: record.id,
                submitted_at,
            })
        }
        Err(err) => {
            tracing::error!("contact submission failed: {err}");
            Err(ContactError::SubmissionFailed)
        }
    }
}

/// JSON body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl ContactResponse {
    pub fn from_outcome(outcome: &Result<SubmissionReceipt, ContactError>, phone: &str) -> Self {
        match outcome {
            Ok(receipt) => Self {
                success: true,
                message: Some(SUCCESS_MESSAGE.to_string()),
                error: None,
                record_id: Some(receipt.record_id.clone()),
            },
            Err(err) => Self {
                success: false,
                message: None,
                error: Some(err.user_message(phone)),
                record_id: None,
            },
        }
    }
}
