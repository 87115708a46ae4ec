//! Reference driver and synthetic workloads.
//!
//! The engine itself only reacts to events. This module supplies the other
//! half for tests and experiments: a `Workload` of arrivals (hand-written or
//! generated with `Workload::bernoulli`) and a `Simulator` that owns the clock
//! and replays the workload to completion.

mod driver;
mod workload;

pub use driver::{SimEvent, SimulationReport, Simulator};
pub use workload::{BernoulliParams, JobSpec, Workload};
