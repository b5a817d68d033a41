use error_types::{ServiceResult, ValidationError as FieldValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError};

// Compile regex patterns once at startup
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r".+@.+\..+").expect("hardcoded email regex is invalid - fix source code")
});

static AVATAR_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$")
        .expect("hardcoded avatar regex is invalid - fix source code")
});

static THUMBNAIL_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://[^\s$.?#].[^\s]*)$")
        .expect("hardcoded thumbnail regex is invalid - fix source code")
});

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(rule_error("email", "Must match an email address!"))
    }
}

pub fn validate_avatar_url(url: &str) -> Result<(), ValidationError> {
    if AVATAR_URL_REGEX.is_match(url) {
        Ok(())
    } else {
        Err(rule_error("url", "Invalid URL for avatar"))
    }
}

/// Empty thumbnails are allowed
pub fn validate_thumbnail_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() || THUMBNAIL_URL_REGEX.is_match(url) {
        Ok(())
    } else {
        Err(rule_error("url", "Invalid URL for thumbnail_url"))
    }
}

/// Run derive rules and lift failures into a client-facing error
pub fn validate_input<T: Validate>(input: &T) -> ServiceResult<()> {
    input
        .validate()
        .map_err(|errors| FieldValidationError::from(errors).into())
}

/// Trim in place; mirrors the `trim: true` schema option
pub fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional field, dropping it when nothing is left
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
