//! Task reports: the pipeline's observable output.
//!
//! Consumers hand every drained task to a [`ReportSink`]. The text format
//! is the line-oriented stdout contract; the JSON format emits one object
//! per line for machine consumers.

use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Outcome, Task, TaskId};

/// Output format for task reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(Error::Config(format!(
                "unknown report format '{other}' (expected text or json)"
            ))),
        }
    }
}

/// Destination for completed task reports.
///
/// Shared between both consumers, so implementations must tolerate
/// concurrent calls.
pub trait ReportSink: Send + Sync {
    fn report(&self, task: &Task) -> Result<()>;
}

/// JSON shape of a single report line.
#[derive(Debug, Serialize)]
struct Report {
    id: TaskId,
    outcome: Outcome,
    created_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// Format a completed task as a single report line (without newline).
///
/// # Errors
/// Returns [`Error::Other`] if the task has not been executed yet.
pub fn format_line(task: &Task, format: Format) -> Result<String> {
    let outcome = task
        .outcome()
        .ok_or_else(|| Error::Other(format!("task #{} reported before completion", task.id)))?;

    match format {
        Format::Text => {
            let completed_at = task.completed_at.map(rfc3339).unwrap_or_default();
            Ok(match outcome {
                Outcome::Success => format!("task #{} completed at {completed_at}", task.id),
                Outcome::Failure => {
                    let error = task.error.map(|e| e.to_string()).unwrap_or_default();
                    format!(
                        "task #{} failed at {completed_at} with error \"{error}\"",
                        task.id
                    )
                }
            })
        }
        Format::Json => {
            let report = Report {
                id: task.id,
                outcome,
                created_at: task.created_at,
                completed_at: task.completed_at,
                error: task.error.map(|e| e.to_string()),
            };
            Ok(serde_json::to_string(&report)?)
        }
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Writes one line per task to any `io::Write`.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    format: Format,
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout(format: Format) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, format: Format) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> ReportSink for WriterSink<W> {
    fn report(&self, task: &Task) -> Result<()> {
        let line = format_line(task, self.format)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| Error::Other("report writer lock poisoned".to_string()))?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

/// Keeps formatted lines in memory. Useful for tests and embedding.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    format: Format,
}

impl MemorySink {
    pub fn new(format: Format) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            format,
        }
    }

    /// Snapshot of everything reported so far, in arrival order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl ReportSink for MemorySink {
    fn report(&self, task: &Task) -> Result<()> {
        let line = format_line(task, self.format)?;
        self.lines
            .lock()
            .map_err(|_| Error::Other("memory sink lock poisoned".to_string()))?
            .push(line);
        Ok(())
    }
}
