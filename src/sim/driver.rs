//! Reference discrete-event driver.
//!
//! Replays a [`Workload`] against a [`SchedulerEngine`], acting as the
//! external simulator: it owns the clock, knows how much work each job truly
//! has left, and turns the engine's decisions into core assignments.
//!
//! # Event order
//!
//! At each instant the driver delivers, in order:
//! 1. completions (cores whose job ran out of work),
//! 2. quantum expiries (round robin only),
//! 3. arrivals, in arrival-then-id order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::workload::{JobSpec, Workload};
use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::models::{CoreId, JobId, Ticks};
use crate::scheduler::{SchedulerEngine, SchedulerStats};
use crate::validation::validate_workload;

/// One event delivered to the engine and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    /// A job arrived; `core` is where it was placed, if anywhere.
    Arrived {
        time: Ticks,
        job: JobId,
        core: Option<CoreId>,
    },
    /// `job` completed on `core`; `next` is the job dispatched after it.
    Finished {
        time: Ticks,
        core: CoreId,
        job: JobId,
        next: Option<JobId>,
    },
    /// A time slice ended on `core`; `next` is the job now running there.
    QuantumExpired {
        time: Ticks,
        core: CoreId,
        next: Option<JobId>,
    },
}

/// Outcome of a full replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Averages over every job in the workload.
    pub stats: SchedulerStats,
    /// Time the last job finished.
    pub makespan: Ticks,
    /// Every event delivered, in delivery order.
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    job: JobId,
    slice_end: Option<Ticks>,
}

/// Drives a workload through the engine to completion.
///
/// # Example
/// ```
/// use u_cpusched::config::SchedulerConfig;
/// use u_cpusched::scheduler::Discipline;
/// use u_cpusched::sim::{Simulator, Workload};
///
/// let workload = Workload::default().with_job(1, 0, 5, 0).with_job(2, 1, 1, 0);
/// let report = Simulator::new(SchedulerConfig::new(1, Discipline::Fcfs), workload)
///     .unwrap()
///     .run()
///     .unwrap();
/// assert_eq!(report.makespan, 6);
/// assert!((report.stats.average_waiting_time - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug)]
pub struct Simulator {
    config: SchedulerConfig,
    engine: SchedulerEngine,
    arrivals: Vec<JobSpec>,
    cursor: usize,
    remaining: HashMap<JobId, Ticks>,
    cores: Vec<Option<Slot>>,
    now: Ticks,
    events: Vec<SimEvent>,
}

impl Simulator {
    /// Validates the configuration and workload and builds a fresh engine.
    pub fn new(config: SchedulerConfig, workload: Workload) -> Result<Self> {
        config.validate_for_driver()?;
        validate_workload(&workload).map_err(SchedulerError::InvalidWorkload)?;
        let engine = SchedulerEngine::from_config(&config)?;
        let arrivals = workload.arrival_order();
        let now = arrivals.first().map_or(0, |j| j.arrival_time);

        Ok(Self {
            cores: vec![None; config.cores],
            config,
            engine,
            arrivals,
            cursor: 0,
            remaining: HashMap::new(),
            now,
            events: Vec::new(),
        })
    }

    /// Runs until every job has finished.
    pub fn run(mut self) -> Result<SimulationReport> {
        while let Some(next) = self.next_event_time() {
            self.advance_to(next);
            self.deliver_completions()?;
            self.deliver_quantum_expiries()?;
            self.deliver_arrivals()?;
            self.check_agreement();
        }

        let stats = self.engine.statistics()?;
        info!(
            jobs = stats.jobs,
            makespan = self.now,
            discipline = %self.config.discipline,
            "simulation complete"
        );
        Ok(SimulationReport {
            stats,
            makespan: self.now,
            events: self.events,
        })
    }

    /// The engine being driven.
    pub fn engine(&self) -> &SchedulerEngine {
        &self.engine
    }

    fn next_event_time(&self) -> Option<Ticks> {
        let arrival = self.arrivals.get(self.cursor).map(|j| j.arrival_time);
        let running = self.cores.iter().flatten().flat_map(|slot| {
            let done = self.now + self.remaining.get(&slot.job).copied().unwrap_or(0);
            std::iter::once(done).chain(slot.slice_end)
        });
        arrival.into_iter().chain(running).min()
    }

    fn advance_to(&mut self, time: Ticks) {
        let elapsed = time - self.now;
        for slot in self.cores.iter().flatten() {
            if let Some(left) = self.remaining.get_mut(&slot.job) {
                *left = (*left - elapsed).max(0);
            }
        }
        self.now = time;
    }

    fn deliver_completions(&mut self) -> Result<()> {
        for core in 0..self.cores.len() {
            let Some(slot) = self.cores[core] else { continue };
            if self.remaining.get(&slot.job).copied().unwrap_or(0) > 0 {
                continue;
            }
            let next = self.engine.job_finished(core, slot.job, self.now)?;
            self.remaining.remove(&slot.job);
            self.events.push(SimEvent::Finished {
                time: self.now,
                core,
                job: slot.job,
                next,
            });
            self.place(core, next);
        }
        Ok(())
    }

    fn deliver_quantum_expiries(&mut self) -> Result<()> {
        if !self.config.discipline.is_time_sliced() {
            return Ok(());
        }
        for core in 0..self.cores.len() {
            let Some(Slot { slice_end: Some(end), .. }) = self.cores[core] else {
                continue;
            };
            if end != self.now {
                continue;
            }
            let next = self.engine.quantum_expired(core, self.now)?;
            self.events.push(SimEvent::QuantumExpired {
                time: self.now,
                core,
                next,
            });
            self.place(core, next);
        }
        Ok(())
    }

    fn deliver_arrivals(&mut self) -> Result<()> {
        while let Some(spec) = self.arrivals.get(self.cursor) {
            if spec.arrival_time != self.now {
                break;
            }
            let spec = spec.clone();
            self.cursor += 1;
            self.remaining.insert(spec.id, spec.run_time);

            let core = self
                .engine
                .job_arrived(spec.id, spec.arrival_time, spec.run_time, spec.priority)?;
            self.events.push(SimEvent::Arrived {
                time: self.now,
                job: spec.id,
                core,
            });
            if let Some(core) = core {
                if let Some(displaced) = self.cores[core] {
                    debug!(job = displaced.job, core, time = self.now, "displaced");
                }
                self.place(core, Some(spec.id));
            }
        }
        Ok(())
    }

    fn place(&mut self, core: CoreId, job: Option<JobId>) {
        let slice_end = self.config.quantum.map(|q| self.now + q);
        self.cores[core] = job.map(|job| Slot { job, slice_end });
    }

    // The engine's view of each core must match the driver's.
    fn check_agreement(&self) {
        for (core, slot) in self.cores.iter().enumerate() {
            let engine_job = self.engine.core(core);
            debug_assert_eq!(
                engine_job.map(|j| j.id),
                slot.map(|s| s.job),
                "core {core} assignment diverged"
            );
            if let Some(job) = engine_job {
                debug_assert_eq!(
                    Some(&job.remaining_time),
                    self.remaining.get(&job.id),
                    "job {} remaining time diverged",
                    job.id
                );
            }
        }
    }
}
