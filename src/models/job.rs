//! Job model.
//!
//! A job is one schedulable unit of CPU work. Its identity, priority, arrival
//! time and needed run time are fixed at arrival; the engine updates the
//! remaining time, first start and finish time as the job moves between the
//! waiting queue, a core and the finished log.

use serde::{Deserialize, Serialize};

use super::{JobId, Ticks};

/// Where a job currently lives inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// In the waiting queue.
    Waiting,
    /// Occupying a core.
    Running,
    /// In the finished log. Terminal.
    Finished,
}

/// A job tracked by the scheduler.
///
/// # Time Representation
/// All times are logical ticks supplied by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Caller-supplied unique identifier.
    pub id: JobId,
    /// Static priority (lower value = higher priority).
    pub priority: i32,
    /// Arrival time.
    pub arrival_time: Ticks,
    /// First time the job occupied a core. Set at most once.
    pub start_time: Option<Ticks>,
    /// Run time still owed.
    pub remaining_time: Ticks,
    /// Run time requested at arrival.
    pub needed_time: Ticks,
    /// Completion time. Set exactly once.
    pub finish_time: Option<Ticks>,
}

impl Job {
    /// Creates an unstarted job needing `run_time` ticks.
    pub fn new(id: JobId, arrival_time: Ticks, run_time: Ticks, priority: i32) -> Self {
        Self {
            id,
            priority,
            arrival_time,
            start_time: None,
            remaining_time: run_time,
            needed_time: run_time,
            finish_time: None,
        }
    }

    /// Whether the job has ever occupied a core.
    pub fn is_started(&self) -> bool {
        self.start_time.is_some()
    }

    /// Whether the job has completed.
    pub fn is_finished(&self) -> bool {
        self.finish_time.is_some()
    }

    /// Records the first dispatch. Later calls leave the start time untouched.
    pub fn mark_started(&mut self, time: Ticks) {
        if self.start_time.is_none() {
            self.start_time = Some(time);
        }
    }

    /// Charges `elapsed` ticks of service, never going below zero.
    ///
    /// Returns the ticks charged past zero, which is non-zero only when the
    /// job was left on a core after its work ran out.
    pub fn consume(&mut self, elapsed: Ticks) -> Ticks {
        let overrun = (elapsed - self.remaining_time).max(0);
        self.remaining_time = (self.remaining_time - elapsed).max(0);
        overrun
    }

    /// Marks the job complete at `time`.
    pub fn mark_finished(&mut self, time: Ticks) {
        self.finish_time = Some(time);
        self.remaining_time = 0;
    }

    /// finish - arrival.
    pub fn turnaround_time(&self) -> Option<Ticks> {
        self.finish_time.map(|f| f - self.arrival_time)
    }

    /// Turnaround time minus needed run time.
    pub fn waiting_time(&self) -> Option<Ticks> {
        self.turnaround_time().map(|t| t - self.needed_time)
    }

    /// first start - arrival.
    pub fn response_time(&self) -> Option<Ticks> {
        self.start_time.map(|s| s - self.arrival_time)
    }
}
