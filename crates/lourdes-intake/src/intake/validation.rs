use serde_json::{Map, Value};

use super::domain::NewEnquiry;

/// Field length caps applied after trimming.
#[derive(Debug, Clone, Copy)]
pub struct IntakePolicy {
    pub max_name_len: usize,
    pub max_email_len: usize,
    pub max_message_len: usize,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            max_name_len: 100,
            max_email_len: 255,
            max_message_len: 5000,
        }
    }
}

/// Structured rejection of an enquiry payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field '{0}' is missing or empty")]
    MissingField(&'static str),
    #[error("field '{0}' is not in an acceptable format")]
    InvalidFormat(&'static str),
    #[error("field '{field}' exceeds the maximum length of {limit}")]
    PayloadTooLarge { field: &'static str, limit: usize },
}

impl ValidationError {
    /// Machine-checkable code carried in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidFormat(_) => "invalid_format",
            ValidationError::PayloadTooLarge { .. } => "payload_too_large",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidFormat(field) => field,
            ValidationError::PayloadTooLarge { field, .. } => field,
        }
    }
}

/// Validate an untyped payload into a sanitized [`NewEnquiry`].
///
/// Pure: no store access, no clock, no IO. Every string field is trimmed
/// before any check, and HTML-escaped on the way out so stored content is
/// inert if it is ever rendered.
pub fn validate_payload(
    payload: &Map<String, Value>,
    policy: &IntakePolicy,
) -> Result<NewEnquiry, ValidationError> {
    let name = required_field(payload, "name")?;
    let email = required_field(payload, "email")?;
    let subject = required_field(payload, "subject")?;
    let message = required_field(payload, "message")?;
    let phone = optional_field(payload, "phone")?;

    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    if let Some(phone) = &phone {
        if !is_valid_phone(phone) {
            return Err(ValidationError::InvalidFormat("phone"));
        }
    }

    check_length("name", &name, policy.max_name_len)?;
    check_length("email", &email, policy.max_email_len)?;
    check_length("message", &message, policy.max_message_len)?;

    Ok(NewEnquiry {
        name: sanitize(&name),
        email: sanitize(&email),
        phone: phone.as_deref().map(sanitize),
        subject: sanitize(&subject),
        message: sanitize(&message),
        client_ip: None,
    })
}

fn required_field(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match payload.get(field) {
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(ValidationError::MissingField(field))
            } else {
                Ok(trimmed.to_string())
            }
        }
        // Non-string scalars are treated as absent rather than coerced.
        Some(_) | None => Err(ValidationError::MissingField(field)),
    }
}

fn optional_field(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match payload.get(field) {
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ValidationError::InvalidFormat(field)),
    }
}

/// Syntactic check only: non-empty local part, one `@`, a dot with content
/// on both sides somewhere in the domain, no whitespace anywhere.
fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}

fn is_valid_phone(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

fn check_length(
    field: &'static str,
    value: &str,
    limit: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > limit {
        Err(ValidationError::PayloadTooLarge { field, limit })
    } else {
        Ok(())
    }
}

/// HTML-escape the characters meaningful to markup.
fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
