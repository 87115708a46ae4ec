//! Scheduling performance metrics.
//!
//! Computed over finished jobs only.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Waiting time | finish - arrival - needed run time |
//! | Turnaround time | finish - arrival |
//! | Response time | first start - arrival |
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.2: Scheduling Criteria

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};
use crate::models::{Job, Ticks};

/// Aggregate statistics over finished jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Number of finished jobs averaged over.
    pub jobs: usize,
    /// Mean waiting time.
    pub average_waiting_time: f64,
    /// Mean turnaround time.
    pub average_turnaround_time: f64,
    /// Mean response time.
    pub average_response_time: f64,
}

impl SchedulerStats {
    /// Computes all three averages.
    ///
    /// Fails with [`SchedulerError::NoFinishedJobs`] when `jobs` is empty.
    pub fn calculate<'a, I>(jobs: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Job> + Clone,
    {
        Ok(Self {
            jobs: jobs.clone().into_iter().count(),
            average_waiting_time: average_waiting_time(jobs.clone())?,
            average_turnaround_time: average_turnaround_time(jobs.clone())?,
            average_response_time: average_response_time(jobs)?,
        })
    }
}

/// Mean of (finish - arrival - needed) over finished jobs.
pub fn average_waiting_time<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Result<f64> {
    mean(jobs, Job::waiting_time)
}

/// Mean of (finish - arrival) over finished jobs.
pub fn average_turnaround_time<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Result<f64> {
    mean(jobs, Job::turnaround_time)
}

/// Mean of (first start - arrival) over finished jobs.
pub fn average_response_time<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Result<f64> {
    mean(jobs, Job::response_time)
}

// Jobs lacking the metric (not finished / never started) are skipped.
fn mean<'a>(
    jobs: impl IntoIterator<Item = &'a Job>,
    metric: impl Fn(&Job) -> Option<Ticks>,
) -> Result<f64> {
    let (total, count) = jobs
        .into_iter()
        .filter(|job| job.is_finished())
        .filter_map(|job| metric(job))
        .fold((0.0_f64, 0usize), |(sum, n), v| (sum + v as f64, n + 1));

    if count == 0 {
        return Err(SchedulerError::NoFinishedJobs);
    }
    Ok(total / count as f64)
}
