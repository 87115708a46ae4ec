//! Event-driven scheduler engine.
//!
//! # Algorithm
//!
//! The engine reacts to three driver events and answers with a scheduling
//! decision:
//!
//! 1. **Arrival**: place the job on the lowest-indexed idle core; otherwise,
//!    under a preemptive discipline, displace the lowest-ranked running job
//!    if the arrival outranks it; otherwise enqueue.
//! 2. **Completion**: retire the job to the finished log and dispatch the
//!    head of the waiting queue onto the freed core.
//! 3. **Quantum expiry**: requeue the running job at the tail and dispatch
//!    the head of the waiting queue.
//!
//! Before handling any event the engine charges every running job for the
//! time elapsed since the previous event, so remaining-time comparisons are
//! exact at every event boundary.
//!
//! # Job lifecycle
//! `Waiting -> Running -> (Waiting -> Running)* -> Finished`

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, trace, warn};

use super::stats::{self, SchedulerStats};
use super::Discipline;
use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::models::{CoreId, Job, JobId, JobState, Ticks};
use crate::queue::{Comparator, InsertionOrder, OrderedQueue};

/// Scheduler state for one simulation run.
///
/// Every job that has arrived is in exactly one of: a core slot, the waiting
/// queue, or the finished log.
///
/// # Example
/// ```
/// use u_cpusched::scheduler::{Discipline, SchedulerEngine};
///
/// let mut engine = SchedulerEngine::new(1, Discipline::Fcfs).unwrap();
/// assert_eq!(engine.job_arrived(1, 0, 5, 0).unwrap(), Some(0));
/// assert_eq!(engine.job_arrived(2, 1, 1, 0).unwrap(), None);
/// assert_eq!(engine.job_finished(0, 1, 5).unwrap(), Some(2));
/// assert_eq!(engine.job_finished(0, 2, 6).unwrap(), None);
/// assert!((engine.average_waiting_time().unwrap() - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct SchedulerEngine {
    discipline: Discipline,
    cores: Vec<Option<Job>>,
    waiting: OrderedQueue<Job, Discipline>,
    finished: OrderedQueue<Job, InsertionOrder>,
    arrived: HashSet<JobId>,
    last_accounted: Option<Ticks>,
}

impl SchedulerEngine {
    /// Creates an engine with `num_cores` idle cores.
    pub fn new(num_cores: usize, discipline: Discipline) -> Result<Self> {
        Self::from_config(&SchedulerConfig::new(num_cores, discipline))
    }

    /// Creates an engine from a validated configuration.
    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        config.validate()?;
        info!(
            cores = config.cores,
            discipline = %config.discipline,
            "scheduler started"
        );
        Ok(Self {
            discipline: config.discipline,
            cores: vec![None; config.cores],
            waiting: OrderedQueue::new(config.discipline),
            finished: OrderedQueue::new(InsertionOrder),
            arrived: HashSet::new(),
            last_accounted: None,
        })
    }

    /// Handles a job arrival.
    ///
    /// Returns the core the job now runs on, or `None` if it was queued.
    pub fn job_arrived(
        &mut self,
        id: JobId,
        arrival_time: Ticks,
        run_time: Ticks,
        priority: i32,
    ) -> Result<Option<CoreId>> {
        if run_time <= 0 {
            return Err(SchedulerError::InvalidJob { id, run_time });
        }
        if self.arrived.contains(&id) {
            return Err(SchedulerError::DuplicateJob(id));
        }
        self.check_time(arrival_time)?;
        self.advance_clock(arrival_time);
        self.arrived.insert(id);

        let mut job = Job::new(id, arrival_time, run_time, priority);

        if let Some(core) = self.cores.iter().position(Option::is_none) {
            job.mark_started(arrival_time);
            self.cores[core] = Some(job);
            debug!(job = id, core, time = arrival_time, "placed on idle core");
            return Ok(Some(core));
        }

        if self.discipline.is_preemptive() {
            if let Some(core) = self.preemption_target(&job) {
                job.mark_started(arrival_time);
                if let Some(preempted) = self.cores[core].replace(job) {
                    debug!(
                        job = id,
                        preempted = preempted.id,
                        core,
                        time = arrival_time,
                        "preempted running job"
                    );
                    self.waiting.offer(preempted);
                }
                return Ok(Some(core));
            }
        }

        let rank = self.waiting.offer(job);
        debug!(job = id, rank, time = arrival_time, "queued");
        Ok(None)
    }

    /// Handles completion of `job_id` on `core`.
    ///
    /// Returns the job dispatched onto the freed core, or `None` if it idles.
    /// A core/job mismatch is rejected before any state changes.
    pub fn job_finished(
        &mut self,
        core: CoreId,
        job_id: JobId,
        finish_time: Ticks,
    ) -> Result<Option<JobId>> {
        self.check_time(finish_time)?;
        match self.core_slot(core)? {
            None => return Err(SchedulerError::CoreIdle(core)),
            Some(running) if running.id != job_id => {
                return Err(SchedulerError::JobMismatch {
                    core,
                    expected: job_id,
                    running: running.id,
                });
            }
            Some(_) => {}
        }

        self.advance_clock(finish_time);
        let Some(mut done) = self.cores[core].take() else {
            return Err(SchedulerError::CoreIdle(core));
        };
        done.mark_finished(finish_time);
        debug!(job = job_id, core, time = finish_time, "finished");
        self.finished.offer(done);

        Ok(self.dispatch(core, finish_time))
    }

    /// Handles a round-robin time-slice boundary on `core`.
    ///
    /// Returns the job now on the core (possibly the same one when nothing
    /// else is waiting), or `None` if the core idles.
    pub fn quantum_expired(&mut self, core: CoreId, time: Ticks) -> Result<Option<JobId>> {
        self.check_time(time)?;
        self.core_slot(core)?;
        if !self.discipline.is_time_sliced() {
            warn!(core, discipline = %self.discipline, "quantum expiry outside RR");
        }
        self.advance_clock(time);

        match self.cores[core].take() {
            Some(job) => {
                trace!(job = job.id, core, time, "requeued on quantum expiry");
                self.waiting.offer(job);
            }
            None if self.waiting.is_empty() => return Ok(None),
            None => {}
        }

        Ok(self.dispatch(core, time))
    }

    /// Mean waiting time over finished jobs.
    pub fn average_waiting_time(&self) -> Result<f64> {
        stats::average_waiting_time(&self.finished)
    }

    /// Mean turnaround time over finished jobs.
    pub fn average_turnaround_time(&self) -> Result<f64> {
        stats::average_turnaround_time(&self.finished)
    }

    /// Mean response time over finished jobs.
    pub fn average_response_time(&self) -> Result<f64> {
        stats::average_response_time(&self.finished)
    }

    /// All three averages at once.
    pub fn statistics(&self) -> Result<SchedulerStats> {
        SchedulerStats::calculate(&self.finished)
    }

    /// Discipline ordering the waiting queue.
    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Number of cores, fixed at start-up.
    pub fn num_cores(&self) -> usize {
        self.cores.len()
    }

    /// Job running on `core`, if any.
    pub fn core(&self, core: CoreId) -> Option<&Job> {
        self.cores.get(core).and_then(Option::as_ref)
    }

    /// Number of cores with no job.
    pub fn idle_cores(&self) -> usize {
        self.cores.iter().filter(|slot| slot.is_none()).count()
    }

    /// Waiting jobs in dispatch order.
    pub fn waiting_jobs(&self) -> impl Iterator<Item = &Job> {
        self.waiting.iter()
    }

    /// Number of jobs in the waiting queue.
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Finished jobs in completion order.
    pub fn finished_jobs(&self) -> impl Iterator<Item = &Job> {
        self.finished.iter()
    }

    /// Number of jobs that have completed.
    pub fn finished_len(&self) -> usize {
        self.finished.len()
    }

    /// Time of the most recent event, if any.
    pub fn last_accounted_time(&self) -> Option<Ticks> {
        self.last_accounted
    }

    /// Where job `id` currently is, or `None` if it never arrived.
    pub fn job_state(&self, id: JobId) -> Option<JobState> {
        if self.cores.iter().flatten().any(|j| j.id == id) {
            Some(JobState::Running)
        } else if self.waiting.iter().any(|j| j.id == id) {
            Some(JobState::Waiting)
        } else if self.finished.iter().any(|j| j.id == id) {
            Some(JobState::Finished)
        } else {
            None
        }
    }

    fn core_slot(&self, core: CoreId) -> Result<Option<&Job>> {
        self.cores
            .get(core)
            .map(Option::as_ref)
            .ok_or(SchedulerError::CoreOutOfRange {
                core,
                cores: self.cores.len(),
            })
    }

    fn check_time(&self, time: Ticks) -> Result<()> {
        match self.last_accounted {
            Some(last) if time < last => Err(SchedulerError::TimeWentBackwards { time, last }),
            _ => Ok(()),
        }
    }

    // Charges running jobs for time elapsed since the last event.
    fn advance_clock(&mut self, time: Ticks) {
        let elapsed = self.last_accounted.map_or(0, |last| time - last);
        if elapsed > 0 {
            for job in self.cores.iter_mut().flatten() {
                let overrun = job.consume(elapsed);
                if overrun > 0 {
                    warn!(job = job.id, overrun, time, "job ran past its remaining time");
                }
                trace!(job = job.id, remaining = job.remaining_time, time, "reconciled");
            }
        }
        self.last_accounted = Some(time);
    }

    // Running job ranked lowest under the discipline, if `incoming` outranks it.
    // Equal-ranked candidates resolve to the lowest core index.
    fn preemption_target(&self, incoming: &Job) -> Option<CoreId> {
        let mut lowest: Option<(CoreId, &Job)> = None;
        for (core, slot) in self.cores.iter().enumerate() {
            let Some(running) = slot else { continue };
            let replace = match lowest {
                None => true,
                Some((_, current)) => {
                    self.discipline.compare(running, current) == Ordering::Greater
                }
            };
            if replace {
                lowest = Some((core, running));
            }
        }

        lowest
            .filter(|&(_, running)| self.discipline.compare(incoming, running) == Ordering::Less)
            .map(|(core, _)| core)
    }

    fn dispatch(&mut self, core: CoreId, time: Ticks) -> Option<JobId> {
        let mut next = self.waiting.poll()?;
        next.mark_started(time);
        let id = next.id;
        self.cores[core] = Some(next);
        debug!(job = id, core, time, "dispatched");
        Some(id)
    }
}

/// Renders cores then the waiting queue as `id(core)`, with `-1` for
/// waiting jobs.
impl fmt::Display for SchedulerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let running = self
            .cores
            .iter()
            .enumerate()
            .filter_map(|(core, slot)| slot.as_ref().map(|j| (j.id, core as i64)));
        let waiting = self.waiting.iter().map(|j| (j.id, -1));

        let mut first = true;
        for (id, core) in running.chain(waiting) {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{id}({core})")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn engine(cores: usize, discipline: Discipline) -> SchedulerEngine {
        SchedulerEngine::new(cores, discipline).unwrap()
    }

    #[test]
    fn test_zero_cores_rejected() {
        let err = SchedulerEngine::new(0, Discipline::Fcfs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_fcfs_end_to_end() {
        let mut e = engine(1, Discipline::Fcfs);
        assert_eq!(e.job_arrived(1, 0, 5, 0).unwrap(), Some(0));
        assert_eq!(e.job_arrived(2, 1, 1, 0).unwrap(), None);
        assert_eq!(e.job_finished(0, 1, 5).unwrap(), Some(2));
        assert_eq!(e.core(0).unwrap().start_time, Some(5));
        assert_eq!(e.job_finished(0, 2, 6).unwrap(), None);

        assert!((e.average_waiting_time().unwrap() - 2.0).abs() < 1e-10);
        assert!((e.average_turnaround_time().unwrap() - 5.0).abs() < 1e-10);
        assert!((e.average_response_time().unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_fcfs_never_preempts() {
        let mut e = engine(1, Discipline::Fcfs);
        e.job_arrived(1, 0, 100, 9).unwrap();
        assert_eq!(e.job_arrived(2, 1, 1, 0).unwrap(), None);
        assert_eq!(e.core(0).unwrap().id, 1);
    }

    #[test]
    fn test_lowest_idle_core_first() {
        let mut e = engine(3, Discipline::Fcfs);
        assert_eq!(e.job_arrived(1, 0, 5, 0).unwrap(), Some(0));
        assert_eq!(e.job_arrived(2, 0, 5, 0).unwrap(), Some(1));
        e.job_finished(0, 1, 2).unwrap();
        assert_eq!(e.job_arrived(3, 3, 5, 0).unwrap(), Some(0));
        assert_eq!(e.job_arrived(4, 3, 5, 0).unwrap(), Some(2));
        assert_eq!(e.idle_cores(), 0);
    }

    #[test]
    fn test_sjf_does_not_preempt() {
        let mut e = engine(1, Discipline::Sjf);
        e.job_arrived(1, 0, 10, 0).unwrap();
        assert_eq!(e.job_arrived(2, 1, 4, 0).unwrap(), None);
    }

    #[test]
    fn test_psjf_preempts_longer_job() {
        let mut e = engine(1, Discipline::Psjf);
        e.job_arrived(1, 0, 10, 0).unwrap();
        assert_eq!(e.job_arrived(2, 1, 4, 0).unwrap(), Some(0));
        assert_eq!(e.core(0).unwrap().id, 2);

        let preempted = e.waiting_jobs().next().unwrap();
        assert_eq!(preempted.id, 1);
        assert_eq!(preempted.remaining_time, 9);
        assert_eq!(preempted.start_time, Some(0));
        assert_eq!(e.job_state(1), Some(JobState::Waiting));
    }

    #[test]
    fn test_psjf_compares_reconciled_remaining_time() {
        let mut e = engine(1, Discipline::Psjf);
        e.job_arrived(1, 0, 10, 0).unwrap();
        // Job 1 has 4 left at t=6, so a 5-tick job must wait.
        assert_eq!(e.job_arrived(2, 6, 5, 0).unwrap(), None);
        assert_eq!(e.core(0).unwrap().remaining_time, 4);
    }

    #[test]
    fn test_preempts_globally_lowest_priority_core() {
        let mut e = engine(2, Discipline::Ppri);
        e.job_arrived(1, 0, 10, 3).unwrap();
        e.job_arrived(2, 0, 10, 5).unwrap();
        assert_eq!(e.job_arrived(3, 1, 10, 1).unwrap(), Some(1));
        assert_eq!(e.core(0).unwrap().id, 1);
        assert_eq!(e.core(1).unwrap().id, 3);
    }

    #[test]
    fn test_ppri_equal_priority_does_not_preempt() {
        let mut e = engine(1, Discipline::Ppri);
        e.job_arrived(1, 0, 10, 2).unwrap();
        assert_eq!(e.job_arrived(2, 1, 1, 2).unwrap(), None);
    }

    #[test]
    fn test_preempted_job_resumes_with_original_start() {
        let mut e = engine(1, Discipline::Psjf);
        e.job_arrived(1, 0, 10, 0).unwrap();
        e.job_arrived(2, 2, 3, 0).unwrap();
        assert_eq!(e.job_finished(0, 2, 5).unwrap(), Some(1));
        let resumed = e.core(0).unwrap();
        assert_eq!(resumed.start_time, Some(0));
        assert_eq!(resumed.remaining_time, 8);
        assert_eq!(e.job_finished(0, 1, 13).unwrap(), None);
        // Response: (0 + 0) / 2; waiting: job1 13-0-10=3, job2 5-2-3=0.
        assert!((e.average_response_time().unwrap() - 0.0).abs() < 1e-10);
        assert!((e.average_waiting_time().unwrap() - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_pri_queue_order() {
        let mut e = engine(1, Discipline::Pri);
        e.job_arrived(1, 0, 10, 0).unwrap();
        e.job_arrived(2, 1, 1, 4).unwrap();
        e.job_arrived(3, 2, 1, 1).unwrap();
        e.job_arrived(4, 3, 1, 4).unwrap();
        let order: Vec<JobId> = e.waiting_jobs().map(|j| j.id).collect();
        assert_eq!(order, vec![3, 2, 4]);
        assert_eq!(e.job_finished(0, 1, 10).unwrap(), Some(3));
    }

    #[test]
    fn test_rr_rotates_to_tail() {
        let mut e = engine(1, Discipline::Rr);
        assert_eq!(e.job_arrived(1, 0, 5, 0).unwrap(), Some(0));
        assert_eq!(e.job_arrived(2, 1, 5, 0).unwrap(), None);
        assert_eq!(e.quantum_expired(0, 2).unwrap(), Some(2));
        assert_eq!(e.job_arrived(3, 3, 5, 0).unwrap(), None);
        assert_eq!(e.quantum_expired(0, 4).unwrap(), Some(1));

        let order: Vec<JobId> = e.waiting_jobs().map(|j| j.id).collect();
        assert_eq!(order, vec![3, 2]);
        assert_eq!(e.waiting_jobs().last().unwrap().remaining_time, 3);
    }

    #[test]
    fn test_rr_alone_keeps_core() {
        let mut e = engine(1, Discipline::Rr);
        e.job_arrived(1, 0, 5, 0).unwrap();
        assert_eq!(e.quantum_expired(0, 2).unwrap(), Some(1));
        assert_eq!(e.core(0).unwrap().remaining_time, 3);
    }

    #[test]
    fn test_quantum_on_idle_core() {
        let mut e = engine(2, Discipline::Rr);
        assert_eq!(e.quantum_expired(1, 0).unwrap(), None);
        e.job_arrived(1, 1, 5, 0).unwrap();
        e.job_arrived(2, 1, 5, 0).unwrap();
        e.job_arrived(3, 1, 5, 0).unwrap();
        e.job_finished(1, 2, 3).unwrap();
        e.job_finished(1, 3, 8).unwrap();
        assert_eq!(e.core(1), None);
        assert_eq!(e.quantum_expired(1, 8).unwrap(), None);
    }

    #[test]
    fn test_finish_on_idle_core_is_inconsistency() {
        let mut e = engine(2, Discipline::Fcfs);
        e.job_arrived(1, 0, 5, 0).unwrap();
        let err = e.job_finished(1, 1, 5).unwrap_err();
        assert_eq!(err, SchedulerError::CoreIdle(1));
        assert_eq!(err.kind(), ErrorKind::Inconsistency);
    }

    #[test]
    fn test_finish_mismatch_leaves_state() {
        let mut e = engine(1, Discipline::Fcfs);
        e.job_arrived(1, 0, 5, 0).unwrap();
        let err = e.job_finished(0, 99, 3).unwrap_err();
        assert!(matches!(err, SchedulerError::JobMismatch { running: 1, .. }));
        assert_eq!(e.core(0).unwrap().remaining_time, 5);
        assert_eq!(e.last_accounted_time(), Some(0));
    }

    #[test]
    fn test_core_out_of_range() {
        let mut e = engine(1, Discipline::Rr);
        assert_eq!(
            e.quantum_expired(3, 0).unwrap_err(),
            SchedulerError::CoreOutOfRange { core: 3, cores: 1 }
        );
    }

    #[test]
    fn test_duplicate_job_rejected() {
        let mut e = engine(1, Discipline::Fcfs);
        e.job_arrived(1, 0, 5, 0).unwrap();
        assert_eq!(
            e.job_arrived(1, 1, 5, 0).unwrap_err(),
            SchedulerError::DuplicateJob(1)
        );
        assert_eq!(e.waiting_len(), 0);
    }

    #[test]
    fn test_time_going_backwards_rejected() {
        let mut e = engine(1, Discipline::Fcfs);
        e.job_arrived(1, 5, 5, 0).unwrap();
        let err = e.job_arrived(2, 4, 5, 0).unwrap_err();
        assert_eq!(err, SchedulerError::TimeWentBackwards { time: 4, last: 5 });
        assert_eq!(e.job_state(2), None);
    }

    #[test]
    fn test_non_positive_run_time_rejected() {
        let mut e = engine(1, Discipline::Fcfs);
        assert!(matches!(
            e.job_arrived(1, 0, 0, 0),
            Err(SchedulerError::InvalidJob { id: 1, run_time: 0 })
        ));
    }

    #[test]
    fn test_statistics_without_finished_jobs() {
        let mut e = engine(1, Discipline::Fcfs);
        e.job_arrived(1, 0, 5, 0).unwrap();
        assert_eq!(e.statistics(), Err(SchedulerError::NoFinishedJobs));
        assert_eq!(
            e.average_turnaround_time().unwrap_err().kind(),
            ErrorKind::NoData
        );
    }

    #[test]
    fn test_job_state_tracking() {
        let mut e = engine(1, Discipline::Fcfs);
        e.job_arrived(1, 0, 2, 0).unwrap();
        e.job_arrived(2, 0, 2, 0).unwrap();
        assert_eq!(e.job_state(1), Some(JobState::Running));
        assert_eq!(e.job_state(2), Some(JobState::Waiting));
        e.job_finished(0, 1, 2).unwrap();
        assert_eq!(e.job_state(1), Some(JobState::Finished));
        assert_eq!(e.job_state(7), None);
        assert_eq!(e.finished_len(), 1);
    }

    #[test]
    fn test_quantum_outside_rr_requeues_by_discipline() {
        let mut e = engine(1, Discipline::Sjf);
        e.job_arrived(1, 0, 10, 0).unwrap();
        assert_eq!(e.job_arrived(2, 1, 3, 0).unwrap(), None);

        // Job 1 goes back in shortest-remaining order, behind job 2.
        assert_eq!(e.quantum_expired(0, 2).unwrap(), Some(2));
        assert_eq!(e.to_string(), "2(0) 1(-1)");
        let requeued = e.waiting_jobs().next().unwrap();
        assert_eq!(requeued.remaining_time, 8);
        assert_eq!(requeued.start_time, Some(0));
        assert_eq!(e.discipline(), Discipline::Sjf);
    }

    #[test]
    fn test_overdue_job_still_finishes() {
        let mut e = engine(1, Discipline::Fcfs);
        e.job_arrived(1, 0, 3, 0).unwrap();
        e.job_arrived(2, 1, 2, 0).unwrap();
        // Completion reported two ticks late.
        assert_eq!(e.job_finished(0, 1, 5).unwrap(), Some(2));
        let done = e.finished_jobs().next().unwrap();
        assert_eq!(done.remaining_time, 0);
        assert_eq!(done.turnaround_time(), Some(5));
    }

    #[test]
    fn test_finished_jobs_in_completion_order() {
        let mut e = engine(2, Discipline::Fcfs);
        assert_eq!(e.num_cores(), 2);
        e.job_arrived(1, 0, 5, 0).unwrap();
        e.job_arrived(2, 0, 2, 0).unwrap();
        e.job_finished(1, 2, 2).unwrap();
        e.job_finished(0, 1, 5).unwrap();
        let order: Vec<JobId> = e.finished_jobs().map(|j| j.id).collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(e.finished_len(), 2);
    }

    #[test]
    fn test_display_queue_dump() {
        let mut e = engine(1, Discipline::Pri);
        e.job_arrived(4, 0, 5, 0).unwrap();
        e.job_arrived(1, 1, 5, 3).unwrap();
        e.job_arrived(2, 2, 5, 1).unwrap();
        assert_eq!(e.to_string(), "4(0) 2(-1) 1(-1)");
    }
}
