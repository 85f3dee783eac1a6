//! Field-level validation errors.
//!
//! Validators collect every failing field before returning so the caller can
//! correct a whole form at once. Messages follow the `"<field> <constraint>"`
//! convention minus the field name, e.g. `"can't be blank"`.

use std::collections::BTreeMap;

use serde::Serialize;

pub const BLANK: &str = "can't be blank";
pub const INVALID: &str = "is invalid";
pub const MUST_BE_BLANK: &str = "must be blank";

/// Accumulated field errors, keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("validation failed")]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Record `can't be blank` when `value` is empty after trimming.
    pub fn require(&mut self, field: &str, value: &str) {
        if is_blank(value) {
            self.add(field, BLANK);
        }
    }

    /// Record `can't be blank` when `value` is `None` or blank.
    pub fn require_some<T: AsRef<str>>(&mut self, field: &str, value: Option<T>) {
        if value
            .as_ref()
            .is_none_or(|v| is_blank(AsRef::<str>::as_ref(v)))
        {
            self.add(field, BLANK);
        }
    }

    /// Fold another validator's errors into this one.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
