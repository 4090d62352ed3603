//! Core data model.
//!
//! A task is a unit of simulated work. It carries identity, a creation
//! timestamp that doubles as its validity signal, and the outcome fields
//! filled in by execution.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Simulated execution latency applied to every task.
pub const WORK_DURATION: Duration = Duration::from_millis(150);

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A unit of work flowing through the pipeline.
///
/// Pending tasks come out of the generator with only `id` and `created_at`
/// populated. [`Task::run`] consumes the pending record and returns the
/// completed one; nothing mutates a task in place once it has been handed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within a run.
    pub id: TaskId,

    /// Generation time. `None` is the sentinel for an invalid task.
    pub created_at: Option<DateTime<Utc>>,

    /// Set once execution finishes.
    pub completed_at: Option<DateTime<Utc>>,

    /// Execution outcome. Meaningless until `completed_at` is set.
    pub success: bool,

    /// Present only when `success` is false.
    pub error: Option<TaskError>,
}

impl Task {
    /// A pending task, as produced by the generator.
    pub fn new(id: TaskId, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            created_at,
            completed_at: None,
            success: false,
            error: None,
        }
    }

    /// A task is valid when it carries a real creation time.
    pub fn is_valid(&self) -> bool {
        self.created_at.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Execute the task: classify, simulate work, stamp completion.
    ///
    /// Failure is terminal. There is no retry path.
    pub async fn run(mut self, work: Duration) -> Self {
        self.success = self.is_valid();
        if !self.success {
            self.error = Some(TaskError::WrongPhase);
        }

        tokio::time::sleep(work).await;

        self.completed_at = Some(Utc::now());
        self
    }

    /// Outcome of a completed task. `None` while still pending.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.is_completed() {
            return None;
        }
        Some(if self.success {
            Outcome::Success
        } else {
            Outcome::Failure
        })
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Newtype for task IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl TaskId {
    /// Draw a random 32-bit id from the leading bits of a v4 UUID.
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_fields().0)
    }

    /// Odd ids mark the task invalid, giving an even coin flip.
    pub fn is_odd(self) -> bool {
        self.0 % 2 == 1
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Validity
// ---------------------------------------------------------------------------

/// How the generator decides whether a task gets a real creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidityMode {
    /// Coin flip on the parity of the random id.
    #[default]
    Random,
    /// Every task gets a real creation time.
    AllValid,
    /// Every task gets the sentinel.
    AllInvalid,
}

impl ValidityMode {
    pub fn is_invalid(self, id: TaskId) -> bool {
        match self {
            ValidityMode::Random => id.is_odd(),
            ValidityMode::AllValid => false,
            ValidityMode::AllInvalid => true,
        }
    }
}

impl FromStr for ValidityMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(ValidityMode::Random),
            "all-valid" => Ok(ValidityMode::AllValid),
            "all-invalid" => Ok(ValidityMode::AllInvalid),
            other => Err(Error::Config(format!(
                "unknown validity mode '{other}' (expected random, all-valid or all-invalid)"
            ))),
        }
    }
}

impl std::fmt::Display for ValidityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValidityMode::Random => "random",
            ValidityMode::AllValid => "all-valid",
            ValidityMode::AllInvalid => "all-invalid",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Which consumer a completed task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        };
        write!(f, "{s}")
    }
}

/// The single way a task can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskError {
    #[error("the moon is in the wrong phase")]
    WrongPhase,
}
