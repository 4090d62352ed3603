//! Tests for task execution and outcome routing.

use std::time::{Duration, Instant};

use chrono::Utc;
use taskflow::engine::{Router, Runner};
use taskflow::model::{Outcome, Task, TaskId};
use tokio::sync::mpsc;

fn drain(mut rx: mpsc::Receiver<Task>) -> tokio::task::JoinHandle<Vec<Task>> {
    tokio::spawn(async move {
        let mut out = Vec::new();
        while let Some(task) = rx.recv().await {
            out.push(task);
        }
        out
    })
}

#[tokio::test]
async fn router_sends_each_task_to_one_channel() {
    let (success_tx, success_rx) = mpsc::channel(4);
    let (failure_tx, failure_rx) = mpsc::channel(4);
    let router = Router::new(success_tx, failure_tx);

    let ok = Task::new(TaskId(2), Some(Utc::now()))
        .run(Duration::ZERO)
        .await;
    let bad = Task::new(TaskId(3), None).run(Duration::ZERO).await;

    assert_eq!(router.route(ok).await.unwrap(), Outcome::Success);
    assert_eq!(router.route(bad).await.unwrap(), Outcome::Failure);
    drop(router);

    let successes = drain(success_rx).await.unwrap();
    let failures = drain(failure_rx).await.unwrap();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].id, TaskId(2));
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].id, TaskId(3));
}

#[tokio::test]
async fn router_rejects_pending_tasks() {
    let (success_tx, _success_rx) = mpsc::channel(1);
    let (failure_tx, _failure_rx) = mpsc::channel(1);
    let router = Router::new(success_tx, failure_tx);

    let pending = Task::new(TaskId(1), Some(Utc::now()));
    assert!(router.route(pending).await.is_err());
}

#[tokio::test]
async fn runner_executes_tasks_concurrently() {
    let (intake_tx, intake_rx) = mpsc::channel(10);
    let (success_tx, success_rx) = mpsc::channel(10);
    let (failure_tx, failure_rx) = mpsc::channel(10);

    let successes = drain(success_rx);
    let failures = drain(failure_rx);

    let started = Instant::now();
    let runner = tokio::spawn(
        Runner::new(Duration::from_millis(150)).run(intake_rx, Router::new(success_tx, failure_tx)),
    );

    for n in 0..8u32 {
        let created_at = if n % 2 == 0 { Some(Utc::now()) } else { None };
        intake_tx.send(Task::new(TaskId(n), created_at)).await.unwrap();
    }
    drop(intake_tx);

    let executed = runner.await.unwrap().unwrap();
    let elapsed = started.elapsed();

    // Outcome channels close once the runner and its units are done.
    let successes = successes.await.unwrap();
    let failures = failures.await.unwrap();

    assert_eq!(executed, 8);
    assert_eq!(successes.len(), 4);
    assert_eq!(failures.len(), 4);
    assert!(successes.iter().all(|t| t.success && t.id.0 % 2 == 0));
    assert!(failures.iter().all(|t| !t.success && t.id.0 % 2 == 1));

    // Eight sequential runs would take 1.2s.
    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_millis(800), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn runner_with_closed_intake_closes_outcome_channels() {
    let (intake_tx, intake_rx) = mpsc::channel::<Task>(1);
    let (success_tx, success_rx) = mpsc::channel(1);
    let (failure_tx, failure_rx) = mpsc::channel(1);
    drop(intake_tx);

    let executed = Runner::new(Duration::from_millis(150))
        .run(intake_rx, Router::new(success_tx, failure_tx))
        .await
        .unwrap();

    assert_eq!(executed, 0);
    assert!(drain(success_rx).await.unwrap().is_empty());
    assert!(drain(failure_rx).await.unwrap().is_empty());
}
