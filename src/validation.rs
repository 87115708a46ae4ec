//! Input validation for workloads.
//!
//! Checks a workload before it is replayed against the engine. Detects:
//! - Duplicate job IDs
//! - Non-positive run times
//! - Negative arrival times
//!
//! All problems are reported at once rather than stopping at the first.

use std::collections::HashSet;

use crate::sim::Workload;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two jobs share the same ID.
    DuplicateId,
    /// A job asks for zero or negative run time.
    InvalidRunTime,
    /// A job arrives before time zero.
    NegativeArrival,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a workload.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_workload(workload: &Workload) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for job in &workload.jobs {
        if !ids.insert(job.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", job.id),
            ));
        }

        if job.run_time <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRunTime,
                format!("Job {} has run time {}", job.id, job.run_time),
            ));
        }

        if job.arrival_time < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeArrival,
                format!("Job {} arrives at {}", job.id, job.arrival_time),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
