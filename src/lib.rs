//! Discrete-event CPU scheduling core.
//!
//! Decides which jobs occupy which cores as job-arrival, job-completion and
//! quantum-expiry events come in, and reports waiting, turnaround and
//! response time over finished jobs. All time is logical and supplied by the
//! caller; everything is single-threaded and deterministic.
//!
//! # Modules
//!
//! - **`queue`**: `OrderedQueue`, a comparator-ordered sequence with stable ties
//! - **`models`**: `Job`, `JobState` and the id/time aliases
//! - **`scheduler`**: `SchedulerEngine`, `Discipline` (FCFS, SJF, PSJF, PRI,
//!   PPRI, RR) and `SchedulerStats`
//! - **`config`**: serde-ready `SchedulerConfig`
//! - **`sim`**: reference driver and synthetic workloads
//! - **`validation`**: workload integrity checks
//!
//! # Concurrency
//!
//! The engine has no interior locking. A host sharing it between threads
//! must serialize every call behind one external lock.
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Arpaci-Dusseau (2018), "Operating Systems: Three Easy Pieces", Ch. 7-9

pub mod config;
pub mod error;
pub mod models;
pub mod queue;
pub mod scheduler;
pub mod sim;
pub mod validation;

pub use config::SchedulerConfig;
pub use error::{ErrorKind, Result, SchedulerError};
pub use scheduler::{Discipline, SchedulerEngine, SchedulerStats};
