//! End-to-end tests for the pipeline.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use taskflow::config::PipelineConfig;
use taskflow::engine::Pipeline;
use taskflow::model::*;
use taskflow::report::{Format, MemorySink};

async fn run(config: PipelineConfig) -> (taskflow::engine::PipelineSummary, Vec<String>) {
    let sink = Arc::new(MemorySink::new(Format::Text));
    let summary = Pipeline::new(config, sink.clone())
        .run()
        .await
        .expect("pipeline run");
    (summary, sink.lines())
}

/// Split a text report line into (id, outcome). Panics on anything malformed.
fn parse_line(line: &str) -> (u32, Outcome) {
    let rest = line.strip_prefix("task #").expect("line prefix");
    let (id, rest) = rest.split_once(' ').expect("id separator");
    let id: u32 = id.parse().expect("numeric id");

    if let Some(ts) = rest.strip_prefix("completed at ") {
        DateTime::parse_from_rfc3339(ts).expect("rfc3339 completion time");
        (id, Outcome::Success)
    } else {
        let rest = rest.strip_prefix("failed at ").expect("failure line");
        let (ts, error) = rest.split_once(" with error ").expect("error suffix");
        DateTime::parse_from_rfc3339(ts).expect("rfc3339 completion time");
        assert_eq!(error, "\"the moon is in the wrong phase\"");
        (id, Outcome::Failure)
    }
}

// ---------------------------------------------------------------------------
// Output contract
// ---------------------------------------------------------------------------

#[tokio::test]
async fn five_tasks_produce_five_report_lines() {
    let (summary, lines) = run(PipelineConfig::default()).await;

    assert_eq!(summary.generated.len(), 5);
    assert_eq!(summary.executed, 5);
    assert_eq!(lines.len(), 5);

    let mut seen = HashSet::new();
    for line in &lines {
        let (id, _) = parse_line(line);
        assert!(seen.insert(id), "id {id} reported twice");
    }
    let generated: HashSet<u32> = summary.generated.iter().map(|id| id.0).collect();
    assert_eq!(seen, generated);
    assert!(summary.is_complete());
}

#[tokio::test]
async fn all_invalid_tasks_land_on_failure_consumer() {
    let config = PipelineConfig::default().with_validity(ValidityMode::AllInvalid);
    let (summary, lines) = run(config).await;

    assert!(summary.succeeded.is_empty());
    assert_eq!(summary.failed.len(), 5);
    for task in &summary.failed {
        assert_eq!(task.error, Some(TaskError::WrongPhase));
    }

    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|l| parse_line(l).1 == Outcome::Failure));
}

#[tokio::test]
async fn all_valid_tasks_land_on_success_consumer() {
    let config = PipelineConfig::default()
        .with_validity(ValidityMode::AllValid)
        .with_task_count(8);
    let (summary, lines) = run(config).await;

    assert_eq!(summary.succeeded.len(), 8);
    assert!(summary.failed.is_empty());
    assert!(lines.iter().all(|l| parse_line(l).1 == Outcome::Success));
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_iff_real_creation_time() {
    let (summary, _) = run(PipelineConfig::default().with_task_count(40)).await;

    for task in summary.tasks() {
        assert_eq!(task.success, task.created_at.is_some(), "task #{}", task.id);
        assert_eq!(task.error.is_some(), !task.success);
    }
    assert!(summary.succeeded.iter().all(|t| t.success));
    assert!(summary.failed.iter().all(|t| !t.success));
}

#[tokio::test]
async fn completion_trails_creation_by_at_least_the_work_duration() {
    let config = PipelineConfig::default()
        .with_validity(ValidityMode::AllValid)
        .with_task_count(10);
    let (summary, _) = run(config).await;

    let floor = chrono::Duration::milliseconds(150);
    for task in summary.tasks() {
        let created = task.created_at.expect("valid task");
        let completed = task.completed_at.expect("completed task");
        assert!(completed - created >= floor, "task #{}", task.id);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn large_runs_report_every_task_once() {
    let config = PipelineConfig::default()
        .with_task_count(3_000)
        .with_work_duration(Duration::from_millis(1));
    let (summary, lines) = run(config).await;

    assert_eq!(summary.reported(), 3_000);
    assert_eq!(lines.len(), 3_000);
    assert!(summary.is_complete());
}

#[tokio::test]
async fn repeated_runs_keep_the_total() {
    for _ in 0..3 {
        let config = PipelineConfig::default()
            .with_task_count(15)
            .with_work_duration(Duration::from_millis(10));
        let (summary, _) = run(config).await;
        assert_eq!(summary.succeeded.len() + summary.failed.len(), 15);
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn zero_tasks_terminates_cleanly() {
    let config = PipelineConfig::default().with_task_count(0);
    let (summary, lines) = tokio::time::timeout(Duration::from_secs(5), run(config))
        .await
        .expect("pipeline must not hang on an empty run");

    assert!(summary.generated.is_empty());
    assert_eq!(summary.executed, 0);
    assert_eq!(summary.reported(), 0);
    assert!(lines.is_empty());
    assert!(summary.is_complete());
}

#[tokio::test]
async fn single_slot_channels_do_not_deadlock() {
    let config = PipelineConfig::default()
        .with_task_count(50)
        .with_intake_capacity(1)
        .with_work_duration(Duration::from_millis(5));
    let (summary, _) = tokio::time::timeout(Duration::from_secs(10), run(config))
        .await
        .expect("pipeline must drain with capacity 1");

    assert_eq!(summary.reported(), 50);
}

#[tokio::test]
async fn zero_capacity_is_rejected() {
    let config = PipelineConfig::default().with_intake_capacity(0);
    let sink = Arc::new(MemorySink::new(Format::Text));
    let result = Pipeline::new(config, sink).run().await;
    assert!(matches!(result, Err(taskflow::error::Error::Config(_))));
}

#[tokio::test]
async fn failing_sink_aborts_without_hanging() {
    struct Broken;
    impl taskflow::report::ReportSink for Broken {
        fn report(&self, _task: &Task) -> taskflow::error::Result<()> {
            Err(taskflow::error::Error::Other("sink offline".to_string()))
        }
    }

    let config = PipelineConfig::default()
        .with_task_count(20)
        .with_work_duration(Duration::from_millis(5));
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        Pipeline::new(config, Arc::new(Broken)).run(),
    )
    .await
    .expect("pipeline must terminate when a consumer fails");

    assert!(result.is_err());
}
