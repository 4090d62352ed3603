//! Task execution span helpers.
//!
//! Provides span creation and outcome recording for tasks flowing
//! through the runner.

use tracing::Span;

use crate::model::{Outcome, TaskId};

/// Start a span for one task's execution and routing.
///
/// The `task.outcome` field is declared empty and filled in by
/// [`record_outcome`].
pub fn start_task_span(id: TaskId, valid: bool) -> Span {
    tracing::info_span!(
        "task.execute",
        "task.id" = %id,
        "task.valid" = valid,
        "task.outcome" = tracing::field::Empty,
    )
}

/// Record where a completed task was routed.
pub fn record_outcome(span: &Span, outcome: Outcome) {
    span.record("task.outcome", tracing::field::display(outcome));
    span.in_scope(|| {
        tracing::debug!(%outcome, "task_routed");
    });
}
