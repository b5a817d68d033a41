//! Validation error types
//!
//! Field-level failures collected from `validator` derive rules, flattened
//! into one readable message for GraphQL clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Validation error with field-level details
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// High-level validation message
    pub message: String,

    /// Field-specific errors, ordered by field name
    pub field_errors: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Names of the offending fields
    pub fn fields(&self) -> Vec<&str> {
        self.field_errors.keys().map(String::as_str).collect()
    }
}

/// Individual field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Error code (e.g., "length", "email", "url")
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut collected = BTreeMap::<String, Vec<FieldError>>::new();

        for (field, field_errors) in errors.field_errors() {
            let entry = collected.entry(field.to_string()).or_default();
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                entry.push(FieldError {
                    code: error.code.to_string(),
                    message,
                });
            }
        }

        let message = collected
            .values()
            .flatten()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            message: if message.is_empty() {
                "Validation failed".to_string()
            } else {
                message
            },
            field_errors: collected,
        }
    }
}
