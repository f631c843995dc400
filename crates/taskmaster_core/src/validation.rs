//! Input validation contract used before any optimistic create.
//!
//! # Invariants
//! - A rejected input carries at least one [`ValidationIssue`].
//! - Validators are pure: they never touch an entity store.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One rejected field of an input payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Non-empty set of issues produced by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", join_issues(.issues))]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    /// Returns `None` when `issues` is empty, so an error value always explains
    /// itself.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Self { issues })
        }
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue::new(field, message)],
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validation collaborator for create inputs.
///
/// Returns the validated (possibly normalised) input on success.
pub trait Validator<I>: Send + Sync {
    fn validate(&self, input: I) -> Result<I, ValidationErrors>;
}

/// Accepts every input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<I> Validator<I> for AcceptAll {
    fn validate(&self, input: I) -> Result<I, ValidationErrors> {
        Ok(input)
    }
}

/// Collects a length-bounded, non-blank text check into `issues`.
///
/// Length is counted in chars on the trimmed value.
pub(crate) fn check_text(
    issues: &mut Vec<ValidationIssue>,
    field: &'static str,
    value: &str,
    required: bool,
    max_chars: usize,
) {
    let trimmed = value.trim();
    if required && trimmed.is_empty() {
        issues.push(ValidationIssue::new(field, "must not be blank"));
        return;
    }
    let count = trimmed.chars().count();
    if count > max_chars {
        issues.push(ValidationIssue::new(
            field,
            format!("must be at most {max_chars} characters, got {count}"),
        ));
    }
}
