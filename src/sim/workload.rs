//! Job workloads for the reference driver.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{JobId, Ticks};

/// One job the driver will deliver as an arrival event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub run_time: Ticks,
    /// Lower value is more urgent. Defaults to 0.
    #[serde(default)]
    pub priority: i32,
}

impl JobSpec {
    /// Creates a job spec.
    pub fn new(id: JobId, arrival_time: Ticks, run_time: Ticks, priority: i32) -> Self {
        Self {
            id,
            arrival_time,
            run_time,
            priority,
        }
    }
}

/// Parameters for [`Workload::bernoulli`].
///
/// Each tick in `0..ticks` produces an arrival with probability `p_arrival`.
/// An arriving job is short with probability `p_short`, long otherwise, and
/// draws its priority uniformly from `priority_range` (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BernoulliParams {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_run: Ticks,
    pub long_run: Ticks,
    pub priority_range: (i32, i32),
}

impl Default for BernoulliParams {
    fn default() -> Self {
        Self {
            ticks: 100,
            p_arrival: 0.3,
            p_short: 0.3,
            short_run: 2,
            long_run: 6,
            priority_range: (0, 4),
        }
    }
}

/// An arrival stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub jobs: Vec<JobSpec>,
}

impl Workload {
    /// Wraps an existing list of jobs.
    pub fn new(jobs: Vec<JobSpec>) -> Self {
        Self { jobs }
    }

    /// Appends a job.
    pub fn with_job(
        mut self,
        id: JobId,
        arrival_time: Ticks,
        run_time: Ticks,
        priority: i32,
    ) -> Self {
        self.jobs.push(JobSpec::new(id, arrival_time, run_time, priority));
        self
    }

    /// Number of jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the workload has no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs ordered by arrival time, then id.
    pub fn arrival_order(&self) -> Vec<JobSpec> {
        let mut jobs = self.jobs.clone();
        jobs.sort_by(|a, b| {
            a.arrival_time
                .cmp(&b.arrival_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        jobs
    }

    /// Total requested run time.
    pub fn total_work(&self) -> Ticks {
        self.jobs.iter().map(|j| j.run_time).sum()
    }

    /// Generates a reproducible synthetic workload.
    pub fn bernoulli(params: &BernoulliParams, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let (lo, hi) = params.priority_range;
        let mut jobs = Vec::new();

        for t in 0..params.ticks {
            if rng.random::<f64>() < params.p_arrival {
                let run_time = if rng.random::<f64>() < params.p_short {
                    params.short_run
                } else {
                    params.long_run
                };
                let priority = rng.random_range(lo.min(hi)..=hi.max(lo));

                jobs.push(JobSpec::new(jobs.len() as JobId, t, run_time, priority));
            }
        }

        Self { jobs }
    }
}
