//! Scheduling disciplines.
//!
//! Each discipline is a waiting-queue ordering plus a preemption flag.
//!
//! | Discipline | Primary key | Tie-break | Preemptive |
//! |------------|-------------|-----------|------------|
//! | FCFS | arrival time | - | no |
//! | SJF | remaining time | arrival time | no |
//! | PSJF | remaining time | arrival time | yes |
//! | PRI | priority (lower first) | arrival time | no |
//! | PPRI | priority (lower first) | arrival time | yes |
//! | RR | insertion order | - | time-sliced |
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::models::Job;
use crate::queue::Comparator;

/// A CPU scheduling discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    /// First come, first served.
    Fcfs,
    /// Shortest job first.
    Sjf,
    /// Preemptive shortest job first (shortest remaining time).
    Psjf,
    /// Static priority.
    Pri,
    /// Preemptive static priority.
    Ppri,
    /// Round robin.
    Rr,
}

impl Discipline {
    /// All disciplines, in declaration order.
    pub const ALL: [Discipline; 6] = [
        Discipline::Fcfs,
        Discipline::Sjf,
        Discipline::Psjf,
        Discipline::Pri,
        Discipline::Ppri,
        Discipline::Rr,
    ];

    /// Short name (e.g., "PSJF").
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::Sjf => "SJF",
            Self::Psjf => "PSJF",
            Self::Pri => "PRI",
            Self::Ppri => "PPRI",
            Self::Rr => "RR",
        }
    }

    /// Discipline description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Fcfs => "First Come First Served",
            Self::Sjf => "Shortest Job First",
            Self::Psjf => "Preemptive Shortest Job First",
            Self::Pri => "Priority",
            Self::Ppri => "Preemptive Priority",
            Self::Rr => "Round Robin",
        }
    }

    /// Whether an arrival may displace a running job.
    pub fn is_preemptive(&self) -> bool {
        matches!(self, Self::Psjf | Self::Ppri)
    }

    /// Whether jobs rotate on quantum expiry.
    pub fn is_time_sliced(&self) -> bool {
        matches!(self, Self::Rr)
    }
}

fn by_arrival(a: &Job, b: &Job) -> Ordering {
    a.arrival_time.cmp(&b.arrival_time)
}

impl Comparator<Job> for Discipline {
    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        match self {
            Self::Fcfs => by_arrival(a, b),
            Self::Sjf | Self::Psjf => a
                .remaining_time
                .cmp(&b.remaining_time)
                .then_with(|| by_arrival(a, b)),
            Self::Pri | Self::Ppri => a
                .priority
                .cmp(&b.priority)
                .then_with(|| by_arrival(a, b)),
            Self::Rr => Ordering::Equal,
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Discipline {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchedulerError::InvalidConfig(format!("unknown discipline '{s}'")))
    }
}
