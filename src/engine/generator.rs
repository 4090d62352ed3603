//! Task generation: one concurrent unit per task, feeding the intake queue.

use std::collections::HashSet;

use chrono::Utc;
use opentelemetry::KeyValue;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Task, TaskId, ValidityMode};
use crate::telemetry::metrics;

/// Produces a fixed number of pending tasks.
#[derive(Debug, Clone, Copy)]
pub struct Generator {
    count: usize,
    validity: ValidityMode,
}

impl Generator {
    pub fn new(count: usize, validity: ValidityMode) -> Self {
        Self { count, validity }
    }

    /// Generate `count` tasks into `intake` and return the ids issued.
    ///
    /// Ids are drawn here, by the single driver, so uniqueness can be
    /// enforced without shared state: a repeated draw is discarded and
    /// redrawn. Building and enqueuing each task happens in its own spawned
    /// unit, so arrival order at the intake is arbitrary.
    ///
    /// The intake closes once the last unit finishes and drops its sender.
    pub async fn seed(self, intake: mpsc::Sender<Task>) -> Result<Vec<TaskId>> {
        let mut issued = HashSet::with_capacity(self.count);
        let mut ids = Vec::with_capacity(self.count);
        let mut units = JoinSet::new();

        for _ in 0..self.count {
            let id = loop {
                let candidate = TaskId::random();
                if issued.insert(candidate) {
                    break candidate;
                }
                debug!(id = %candidate, "id collision, redrawing");
            };
            ids.push(id);

            let intake = intake.clone();
            let validity = self.validity;
            units.spawn(async move {
                let task = generate_task(id, validity);
                let valid = task.is_valid();
                intake
                    .send(task)
                    .await
                    .map_err(|_| Error::ChannelClosed("intake"))?;
                metrics::tasks_generated().add(1, &[KeyValue::new("valid", valid)]);
                Ok::<_, Error>(())
            });
        }
        drop(intake);

        while let Some(joined) = units.join_next().await {
            joined??;
        }

        info!(count = ids.len(), validity = %self.validity, "generation finished");
        Ok(ids)
    }
}

/// Build one pending task. Invalid tasks carry the sentinel creation time.
pub fn generate_task(id: TaskId, validity: ValidityMode) -> Task {
    let created_at = if validity.is_invalid(id) {
        None
    } else {
        Some(Utc::now())
    };
    Task::new(id, created_at)
}
