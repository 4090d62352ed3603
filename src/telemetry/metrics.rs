//! Metric instrument factories for taskflow.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a provider the instruments are no-ops.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("taskflow")
}

/// Counter: tasks pushed into the intake queue.
/// Labels: `valid` (bool).
pub fn tasks_generated() -> Counter<u64> {
    meter()
        .u64_counter("taskflow.tasks.generated")
        .with_description("Number of tasks generated")
        .build()
}

/// Counter: completed tasks delivered to an outcome channel.
/// Labels: `outcome` ("success" | "failure").
pub fn tasks_routed() -> Counter<u64> {
    meter()
        .u64_counter("taskflow.tasks.routed")
        .with_description("Number of completed tasks routed by outcome")
        .build()
}

/// Histogram: wall time from dequeue to completion.
pub fn task_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("taskflow.task.duration_ms")
        .with_description("Task execution duration in milliseconds")
        .with_unit("ms")
        .build()
}
