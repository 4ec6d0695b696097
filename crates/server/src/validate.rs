//! Field-level request validation.
//!
//! Handlers validate typed payloads before invoking the domain, collecting
//! every violation into a field→message map so the client sees all problems
//! at once.

use std::collections::BTreeMap;

use crate::error::ApiError;

/// Collects field-level constraint violations.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Start an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for a field. The first message per field wins.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_insert_with(|| message.into());
    }

    /// Record a violation unless the condition holds.
    pub fn check(&mut self, field: &str, ok: bool, message: &str) {
        if !ok {
            self.push(field, message);
        }
    }

    /// Finish: `Ok` when nothing was recorded, else `ValidationFailed`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` carrying the collected map.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.0))
        }
    }
}

/// Whether a string is non-blank and within a length cap.
#[must_use]
pub fn required_within(value: &str, max: usize) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && value.len() <= max
}

/// Whether an optional string is within a length cap.
#[must_use]
pub fn optional_within(value: Option<&str>, max: usize) -> bool {
    value.is_none_or(|v| v.len() <= max)
}
