//! Pipeline engine: generator → intake → runner → router → consumers.
//!
//! Every stage runs as its own tokio task. Channels close by reference
//! count: the intake when the last generator unit drops its sender, each
//! outcome channel when the last router clone is dropped. Shutdown is a
//! drain, never a timed wait.

pub mod consumer;
pub mod generator;
pub mod runner;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::{Outcome, Task, TaskId};
use crate::report::ReportSink;

pub use consumer::{Consumer, ConsumerSummary};
pub use generator::Generator;
pub use runner::{Router, Runner};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Ids in the order the generator issued them.
    pub generated: Vec<TaskId>,
    /// Number of tasks the runner executed.
    pub executed: usize,
    /// Tasks drained by the success consumer, in arrival order.
    pub succeeded: Vec<Task>,
    /// Tasks drained by the failure consumer, in arrival order.
    pub failed: Vec<Task>,
}

impl PipelineSummary {
    /// Total tasks reported across both consumers.
    pub fn reported(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// All reported tasks, successes first.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.succeeded.iter().chain(self.failed.iter())
    }

    /// True when every generated id was reported exactly once.
    pub fn is_complete(&self) -> bool {
        let mut reported = HashSet::with_capacity(self.reported());
        let unique = self.tasks().all(|task| reported.insert(task.id));
        unique
            && reported.len() == self.generated.len()
            && self.generated.iter().all(|id| reported.contains(id))
    }
}

/// One configured run of the pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    sink: Arc<dyn ReportSink>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, sink: Arc<dyn ReportSink>) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run to completion and return what each stage saw.
    ///
    /// Blocks on both consumers first (the completion barrier), then joins
    /// the generator and runner so their errors surface.
    pub async fn run(&self) -> Result<PipelineSummary> {
        self.config.validate()?;
        let started = Instant::now();
        let capacity = self.config.intake_capacity;

        let (intake_tx, intake_rx) = mpsc::channel(capacity);
        let (success_tx, success_rx) = mpsc::channel(capacity);
        let (failure_tx, failure_rx) = mpsc::channel(capacity);

        info!(
            tasks = self.config.task_count,
            capacity,
            validity = %self.config.validity,
            "pipeline starting"
        );

        let success = tokio::spawn(
            Consumer::new(Outcome::Success, Arc::clone(&self.sink)).drain(success_rx),
        );
        let failure = tokio::spawn(
            Consumer::new(Outcome::Failure, Arc::clone(&self.sink)).drain(failure_rx),
        );

        let runner = tokio::spawn(
            Runner::new(self.config.work_duration)
                .run(intake_rx, Router::new(success_tx, failure_tx)),
        );
        let generator = tokio::spawn(
            Generator::new(self.config.task_count, self.config.validity).seed(intake_tx),
        );

        let (success, failure) = tokio::join!(success, failure);
        let succeeded = success??.tasks;
        let failed = failure??.tasks;

        let generated = generator.await??;
        let executed = runner.await??;

        info!(
            generated = generated.len(),
            succeeded = succeeded.len(),
            failed = failed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline drained"
        );

        Ok(PipelineSummary {
            generated,
            executed,
            succeeded,
            failed,
        })
    }
}
