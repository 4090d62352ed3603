//! Outcome consumers: drain one channel each and report every task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{Outcome, Task};
use crate::report::ReportSink;

/// Everything one consumer saw before its channel closed.
#[derive(Debug, Clone)]
pub struct ConsumerSummary {
    pub outcome: Outcome,
    pub tasks: Vec<Task>,
}

/// Drains the channel for one outcome.
pub struct Consumer {
    outcome: Outcome,
    sink: Arc<dyn ReportSink>,
}

impl Consumer {
    pub fn new(outcome: Outcome, sink: Arc<dyn ReportSink>) -> Self {
        Self { outcome, sink }
    }

    /// Report tasks until every sender is gone.
    ///
    /// The consumer never closes its own channel: it ends when the last
    /// router clone is dropped and `recv` yields `None`.
    pub async fn drain(self, mut tasks: mpsc::Receiver<Task>) -> Result<ConsumerSummary> {
        let mut seen = Vec::new();

        while let Some(task) = tasks.recv().await {
            if task.outcome() != Some(self.outcome) {
                warn!(id = %task.id, expected = %self.outcome, "task delivered to wrong consumer");
            }
            self.sink.report(&task)?;
            debug!(id = %task.id, outcome = %self.outcome, "task reported");
            seen.push(task);
        }

        info!(outcome = %self.outcome, count = seen.len(), "consumer drained");
        Ok(ConsumerSummary {
            outcome: self.outcome,
            tasks: seen,
        })
    }
}
