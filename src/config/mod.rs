//! Typed configuration from environment variables.
//!
//! Loads once at startup. Every variable is optional and falls back to the
//! pipeline defaults, but a variable that is set and fails to parse is a hard
//! error rather than a silent default.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::{ValidityMode, WORK_DURATION};

/// Default number of tasks generated per run.
pub const DEFAULT_TASK_COUNT: usize = 5;
/// Default capacity of the intake queue.
pub const DEFAULT_INTAKE_CAPACITY: usize = 10;

/// Parameters for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How many tasks the generator produces.
    pub task_count: usize,
    /// Slots in the intake queue (and each outcome channel). Must be non-zero.
    pub intake_capacity: usize,
    /// Simulated latency of each task.
    pub work_duration: Duration,
    /// Validity policy applied at generation time.
    pub validity: ValidityMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task_count: DEFAULT_TASK_COUNT,
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            work_duration: WORK_DURATION,
            validity: ValidityMode::Random,
        }
    }
}

impl PipelineConfig {
    pub fn with_task_count(mut self, task_count: usize) -> Self {
        self.task_count = task_count;
        self
    }

    pub fn with_validity(mut self, validity: ValidityMode) -> Self {
        self.validity = validity;
        self
    }

    pub fn with_work_duration(mut self, work_duration: Duration) -> Self {
        self.work_duration = work_duration;
        self
    }

    pub fn with_intake_capacity(mut self, intake_capacity: usize) -> Self {
        self.intake_capacity = intake_capacity;
        self
    }

    /// Reject values the channels cannot be built with.
    pub fn validate(&self) -> Result<()> {
        if self.intake_capacity == 0 {
            return Err(Error::Config(
                "intake capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let defaults = PipelineConfig::default();

        let pipeline = PipelineConfig {
            task_count: optional_var("TASK_COUNT")?.unwrap_or(defaults.task_count),
            intake_capacity: optional_var("INTAKE_CAPACITY")?.unwrap_or(defaults.intake_capacity),
            work_duration: optional_var::<u64>("WORK_DURATION_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.work_duration),
            validity: optional_var("TASK_VALIDITY")?.unwrap_or(defaults.validity),
        };
        pipeline.validate()?;

        Ok(Self {
            pipeline,
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid value for {name} ({raw:?}): {e}"))),
        Err(_) => Ok(None),
    }
}
