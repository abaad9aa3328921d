//! Rule collection for entity and command validation

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrorDetail {
    /// Field the rule applies to
    pub error: String,
    /// Human readable message
    pub detail: String,
}

impl ValidationErrorDetail {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ValidationErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.detail)
    }
}

/// Accumulates rule failures for one object
#[derive(Debug, Default)]
pub struct RuleSet {
    errors: Vec<ValidationErrorDetail>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field` unless `ok` holds
    pub fn ensure(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(ValidationErrorDetail::new(field, message));
        }
        self
    }

    pub fn not_empty(&mut self, value: &str, field: &str, message: &str) -> &mut Self {
        self.ensure(!value.trim().is_empty(), field, message)
    }

    pub fn max_len(&mut self, value: &str, max: usize, field: &str, message: &str) -> &mut Self {
        self.ensure(value.chars().count() <= max, field, message)
    }

    pub fn email(&mut self, value: &str, field: &str, message: &str) -> &mut Self {
        self.ensure(is_valid_email(value), field, message)
    }

    /// Merge failures from a nested object, prefixing its field names
    pub fn nested(&mut self, prefix: &str, errors: Vec<ValidationErrorDetail>) -> &mut Self {
        self.errors.extend(errors.into_iter().map(|e| ValidationErrorDetail {
            error: format!("{}.{}", prefix, e.error),
            detail: e.detail,
        }));
        self
    }

    pub fn errors(&self) -> &[ValidationErrorDetail] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationErrorDetail> {
        self.errors
    }

    /// `Ok(())` when no rule failed, otherwise [`CacheError::Validation`]
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CacheError::Validation(self.errors))
        }
    }
}

/// Minimal structural email check: `local@domain.tld` with no whitespace
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
