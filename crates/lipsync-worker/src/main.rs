//! Alignment worker binary.
//!
//! Usage: `lipsync-worker <manifest.json>`

use std::path::PathBuf;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lipsync_worker::{AlignmentJob, JobManifest, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to install metrics recorder: {}", e);
            std::process::exit(1);
        }
    };

    let Some(manifest_path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        error!("Usage: lipsync-worker <manifest.json>");
        std::process::exit(2);
    };

    info!("Starting lipsync-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let manifest = match JobManifest::load(&manifest_path).await {
        Ok(m) => m,
        Err(e) => {
            error!("Failed to load manifest {}: {}", manifest_path.display(), e);
            std::process::exit(e.exit_code());
        }
    };

    let job = AlignmentJob::new(config);
    let outcome = job.run(manifest).await;

    info!(metrics = %metrics.render(), "Metrics snapshot");

    match outcome {
        Ok(report) => {
            info!(
                job_id = %report.job_id,
                report = %report.outputs.report.display(),
                "Worker finished"
            );
        }
        Err(e) => {
            error!("Job failed: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
