//! taskflow CLI: run the pipeline once and report every task on stdout.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use taskflow::config::Config;
use taskflow::engine::Pipeline;
use taskflow::model::ValidityMode;
use taskflow::report::{Format, WriterSink};
use taskflow::telemetry::{TelemetryConfig, init_telemetry};
use tracing::info;

#[derive(Parser)]
#[command(name = "taskflow", about = "Generate, run and route synthetic tasks")]
struct Cli {
    /// Number of tasks to generate (overrides TASK_COUNT)
    #[arg(short = 'n', long)]
    tasks: Option<usize>,
    /// Report format: text or json
    #[arg(long, default_value = "text")]
    format: Format,
    /// Validity policy: random, all-valid or all-invalid (overrides TASK_VALIDITY)
    #[arg(long)]
    validity: Option<ValidityMode>,
    /// Simulated work per task in milliseconds (overrides WORK_DURATION_MS)
    #[arg(long)]
    work_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(tasks) = cli.tasks {
        config.pipeline.task_count = tasks;
    }
    if let Some(validity) = cli.validity {
        config.pipeline.validity = validity;
    }
    if let Some(ms) = cli.work_ms {
        config.pipeline.work_duration = Duration::from_millis(ms);
    }

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "taskflow".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let sink = Arc::new(WriterSink::stdout(cli.format));
    let summary = Pipeline::new(config.pipeline, sink).run().await?;

    if !summary.is_complete() {
        anyhow::bail!(
            "{} task(s) generated but {} reported",
            summary.generated.len(),
            summary.reported()
        );
    }

    info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        "all tasks reported"
    );
    Ok(())
}
