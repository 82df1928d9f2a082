//! Field validation shared by model input types.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9(][0-9 ()\-]{2,19}$").expect("valid phone regex"));

/// Validation failure for model input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    #[error("field `{0}` must not be blank")]
    BlankField(&'static str),
    /// Phone value does not look like a dialable number.
    #[error("invalid phone number `{0}`")]
    InvalidPhone(String),
    /// Publication kind outside the supported set.
    #[error("invalid publication type `{0}`; expected newspaper|magazine")]
    InvalidPublicationKind(String),
    /// Subscription end precedes its start.
    #[error("subscription end date {end} is earlier than start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn validate_phone(phone: Option<&str>) -> Result<(), ValidationError> {
    match phone {
        Some(value) if !PHONE_RE.is_match(value.trim()) => {
            Err(ValidationError::InvalidPhone(value.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{require_text, validate_phone, ValidationError};

    #[test]
    fn phone_accepts_common_formats() {
        for phone in ["+353 1 234 5678", "(01) 555-0199", "0871234567"] {
            validate_phone(Some(phone)).expect("phone should validate");
        }
        validate_phone(None).expect("missing phone is allowed");
    }

    #[test]
    fn phone_rejects_letters() {
        let err = validate_phone(Some("call me")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidPhone("call me".to_string()));
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            require_text("name", "   ").unwrap_err(),
            ValidationError::BlankField("name")
        );
    }
}
