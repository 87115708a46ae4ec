//! Engine configuration.
//!
//! Serde-ready so a host can load it from JSON, TOML or similar. Reading
//! configuration files is left to the host.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};
use crate::models::Ticks;
use crate::scheduler::Discipline;

/// Start-up parameters for a scheduler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of execution cores (must be positive).
    pub cores: usize,
    /// Scheduling discipline.
    pub discipline: Discipline,
    /// Time slice length. Only meaningful for round robin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum: Option<Ticks>,
}

impl SchedulerConfig {
    /// Creates a configuration without a quantum.
    pub fn new(cores: usize, discipline: Discipline) -> Self {
        Self {
            cores,
            discipline,
            quantum: None,
        }
    }

    /// Sets the round-robin quantum.
    pub fn with_quantum(mut self, quantum: Ticks) -> Self {
        self.quantum = Some(quantum);
        self
    }

    /// Checks that the configuration is usable by the engine.
    pub fn validate(&self) -> Result<()> {
        if self.cores == 0 {
            return Err(SchedulerError::InvalidConfig("core count must be positive".into()));
        }
        match self.quantum {
            Some(q) if q <= 0 => Err(SchedulerError::InvalidConfig(format!(
                "quantum must be positive, got {q}"
            ))),
            Some(_) if !self.discipline.is_time_sliced() => {
                Err(SchedulerError::InvalidConfig(format!(
                    "quantum is only valid for RR, not {}",
                    self.discipline
                )))
            }
            _ => Ok(()),
        }
    }

    /// Like [`validate`](Self::validate), and additionally requires a
    /// quantum when the discipline is round robin. Used by drivers that
    /// generate quantum-expiry events themselves.
    pub fn validate_for_driver(&self) -> Result<()> {
        self.validate()?;
        if self.discipline.is_time_sliced() && self.quantum.is_none() {
            return Err(SchedulerError::InvalidConfig(
                "RR requires a quantum".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_configs() {
        assert!(SchedulerConfig::new(2, Discipline::Fcfs).validate().is_ok());
        assert!(SchedulerConfig::new(1, Discipline::Rr)
            .with_quantum(3)
            .validate_for_driver()
            .is_ok());
    }

    #[test]
    fn test_zero_cores_rejected() {
        let err = SchedulerConfig::new(0, Discipline::Sjf).validate().unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidConfig(_)));
    }

    #[test]
    fn test_quantum_rules() {
        assert!(SchedulerConfig::new(1, Discipline::Pri)
            .with_quantum(2)
            .validate()
            .is_err());
        assert!(SchedulerConfig::new(1, Discipline::Rr)
            .with_quantum(0)
            .validate()
            .is_err());
        assert!(SchedulerConfig::new(1, Discipline::Rr).validate().is_ok());
        assert!(SchedulerConfig::new(1, Discipline::Rr)
            .validate_for_driver()
            .is_err());
    }

    #[test]
    fn test_deserialize() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"cores": 4, "discipline": "rr", "quantum": 2}"#).unwrap();
        assert_eq!(config, SchedulerConfig::new(4, Discipline::Rr).with_quantum(2));

        let config: SchedulerConfig =
            serde_json::from_str(r#"{"cores": 1, "discipline": "psjf"}"#).unwrap();
        assert_eq!(config.quantum, None);
    }
}
