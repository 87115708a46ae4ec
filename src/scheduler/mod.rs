//! Scheduler engine, disciplines and statistics.
//!
//! `SchedulerEngine` owns the core slots, the waiting queue (ordered by the
//! configured `Discipline`) and the finished log, and turns driver events into
//! scheduling decisions.
//!
//! # Statistics
//!
//! `SchedulerStats` reports mean waiting, turnaround and response time over
//! finished jobs.
//!
//! # References
//!
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Arpaci-Dusseau (2018), "Operating Systems: Three Easy Pieces", Ch. 7-9

mod discipline;
mod engine;
pub mod stats;

pub use discipline::Discipline;
pub use engine::SchedulerEngine;
pub use stats::SchedulerStats;
