//! Error types for the scheduling core.
//!
//! Errors fall into three categories that callers can tell apart through
//! [`SchedulerError::kind`]:
//!
//! | Kind | Meaning |
//! |------|---------|
//! | `Precondition` | The caller broke the calling contract (bad config, duplicate id, time going backwards) |
//! | `Inconsistency` | An event contradicts the engine's state (finishing an idle core) |
//! | `NoData` | A query has nothing to report (statistics before any job finished) |
//!
//! None of these is ever used for the "no scheduling change" outcome, which
//! is `Ok(None)`.

use crate::models::{CoreId, JobId, Ticks};
use crate::validation::ValidationError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Category of a [`SchedulerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Calling-contract violation.
    Precondition,
    /// Event disagrees with the engine's current state.
    Inconsistency,
    /// Query has no value to return.
    NoData,
}

/// Errors reported by the scheduler engine and its driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid workload: {} problem(s)", .0.len())]
    InvalidWorkload(Vec<ValidationError>),

    #[error("job {id} has non-positive run time {run_time}")]
    InvalidJob { id: JobId, run_time: Ticks },

    #[error("job {0} has already arrived")]
    DuplicateJob(JobId),

    #[error("event time {time} is earlier than last accounted time {last}")]
    TimeWentBackwards { time: Ticks, last: Ticks },

    #[error("core {core} out of range (engine has {cores} cores)")]
    CoreOutOfRange { core: CoreId, cores: usize },

    #[error("core {0} is idle")]
    CoreIdle(CoreId),

    #[error("core {core} runs job {running}, not job {expected}")]
    JobMismatch {
        core: CoreId,
        expected: JobId,
        running: JobId,
    },

    #[error("no finished jobs")]
    NoFinishedJobs,
}

impl SchedulerError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_)
            | Self::InvalidWorkload(_)
            | Self::InvalidJob { .. }
            | Self::DuplicateJob(_)
            | Self::TimeWentBackwards { .. }
            | Self::CoreOutOfRange { .. } => ErrorKind::Precondition,
            Self::CoreIdle(_) | Self::JobMismatch { .. } => ErrorKind::Inconsistency,
            Self::NoFinishedJobs => ErrorKind::NoData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        assert_eq!(SchedulerError::DuplicateJob(1).kind(), ErrorKind::Precondition);
        assert_eq!(
            SchedulerError::TimeWentBackwards { time: 1, last: 2 }.kind(),
            ErrorKind::Precondition
        );
        assert_eq!(SchedulerError::CoreIdle(0).kind(), ErrorKind::Inconsistency);
        assert_eq!(SchedulerError::NoFinishedJobs.kind(), ErrorKind::NoData);
    }

    #[test]
    fn test_error_display() {
        let err = SchedulerError::JobMismatch {
            core: 1,
            expected: 7,
            running: 3,
        };
        assert_eq!(err.to_string(), "core 1 runs job 3, not job 7");
        assert_eq!(
            SchedulerError::CoreOutOfRange { core: 4, cores: 2 }.to_string(),
            "core 4 out of range (engine has 2 cores)"
        );
    }
}
