//! Task execution and outcome routing.

use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{Instrument, info};

use crate::error::{Error, Result};
use crate::model::{Outcome, Task};
use crate::telemetry::metrics;
use crate::telemetry::task::{record_outcome, start_task_span};

/// Fan-out from completed tasks to the two outcome channels.
///
/// Cloned into every in-flight unit. An outcome channel closes when the
/// last clone is dropped, so it can never close under a live producer.
#[derive(Debug, Clone)]
pub struct Router {
    success: mpsc::Sender<Task>,
    failure: mpsc::Sender<Task>,
}

impl Router {
    pub fn new(success: mpsc::Sender<Task>, failure: mpsc::Sender<Task>) -> Self {
        Self { success, failure }
    }

    /// Deliver a completed task to exactly one channel.
    pub async fn route(&self, task: Task) -> Result<Outcome> {
        let outcome = task
            .outcome()
            .ok_or_else(|| Error::Other(format!("task #{} routed before completion", task.id)))?;

        match outcome {
            Outcome::Success => self
                .success
                .send(task)
                .await
                .map_err(|_| Error::ChannelClosed("success"))?,
            Outcome::Failure => self
                .failure
                .send(task)
                .await
                .map_err(|_| Error::ChannelClosed("failure"))?,
        }

        metrics::tasks_routed().add(1, &[KeyValue::new("outcome", outcome.to_string())]);
        Ok(outcome)
    }
}

/// Executes every task from the intake, each in its own unit.
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    work_duration: Duration,
}

impl Runner {
    pub fn new(work_duration: Duration) -> Self {
        Self { work_duration }
    }

    /// Drain `intake`, executing and routing each task concurrently.
    ///
    /// Returns once the intake is closed and every in-flight unit has
    /// finished routing. Returns the number of tasks executed.
    pub async fn run(self, mut intake: mpsc::Receiver<Task>, router: Router) -> Result<usize> {
        let mut in_flight = JoinSet::new();

        while let Some(task) = intake.recv().await {
            let router = router.clone();
            let work = self.work_duration;
            let span = start_task_span(task.id, task.is_valid());
            in_flight.spawn(
                async move {
                    let started = Instant::now();
                    let completed = task.run(work).await;
                    metrics::task_duration_ms()
                        .record(started.elapsed().as_secs_f64() * 1000.0, &[]);
                    let outcome = router.route(completed).await?;
                    record_outcome(&tracing::Span::current(), outcome);
                    Ok::<_, Error>(outcome)
                }
                .instrument(span),
            );
        }

        // Only in-flight units hold router clones from here on.
        drop(router);

        let mut executed = 0;
        while let Some(joined) = in_flight.join_next().await {
            joined??;
            executed += 1;
        }

        info!(executed, "intake drained");
        Ok(executed)
    }
}
