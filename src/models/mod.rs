//! Scheduling domain models.
//!
//! | Type | Meaning |
//! |------|---------|
//! | `Job` | One unit of CPU work and its timing record |
//! | `JobState` | Waiting, Running or Finished |
//! | `JobId` | Caller-supplied job identifier |
//! | `CoreId` | Zero-based core index |
//! | `Ticks` | Logical time |

mod job;

pub use job::{Job, JobState};

/// Caller-supplied unique job identifier.
pub type JobId = u64;
/// Zero-based index of an execution core.
pub type CoreId = usize;
/// Logical time unit.
pub type Ticks = i64;
