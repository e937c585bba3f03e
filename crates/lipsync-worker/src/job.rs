//! One alignment job: load inputs, run the engine, write outputs.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use lipsync_engine::{AlignmentEngine, ShortfallTruncation, Thresholds};
use lipsync_models::{format_seconds, Segment, TalkTiming, TimelinePlan};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{info, Instrument};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::manifest::{JobId, JobManifest};
use crate::pcm;

pub const PLAN_FILE: &str = "plan.json";
pub const PLAN_SCHEMA_FILE: &str = "plan.schema.json";
pub const REALIGNED_FILE: &str = "realigned.f32le";
pub const REPORT_FILE: &str = "report.json";

/// Worker-level metric names.
pub mod names {
    pub const JOBS_COMPLETED_TOTAL: &str = "lipsync_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "lipsync_jobs_failed_total";
    pub const JOB_DURATION_SECONDS: &str = "lipsync_job_duration_seconds";
}

/// Summary written to `report.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job_id: JobId,
    pub completed_at: DateTime<Utc>,
    pub audio_duration: f64,
    pub video_duration: f64,
    /// Human-readable `video_duration`.
    pub video_length: String,
    pub thresholds: Thresholds,
    pub segments: Vec<Segment>,
    pub talk_timings: Vec<TalkTiming>,
    pub shortfalls: Vec<ShortfallTruncation>,
    pub final_drift: f64,
    pub max_drift: f64,
    pub outputs: JobOutputs,
}

/// Files a job produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutputs {
    pub plan: PathBuf,
    pub plan_schema: PathBuf,
    pub realigned_audio: PathBuf,
    pub report: PathBuf,
}

impl JobOutputs {
    fn in_dir(dir: PathBuf) -> Self {
        Self {
            plan: dir.join(PLAN_FILE),
            plan_schema: dir.join(PLAN_SCHEMA_FILE),
            realigned_audio: dir.join(REALIGNED_FILE),
            report: dir.join(REPORT_FILE),
        }
    }
}

/// Runs alignment jobs with a fixed worker configuration.
#[derive(Debug, Clone)]
pub struct AlignmentJob {
    config: WorkerConfig,
}

impl AlignmentJob {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Run one job end to end and record its outcome.
    pub async fn run(&self, manifest: JobManifest) -> WorkerResult<JobReport> {
        let logger = JobLogger::new(&manifest.job_id, "alignment");
        let span = logger.create_span();
        let started = Instant::now();

        let result = self.execute(&manifest, &logger).instrument(span).await;

        histogram!(names::JOB_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        match &result {
            Ok(report) => {
                counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
                logger.log_completion(&format!(
                    "{} of video, {} shortfall(s)",
                    report.video_length,
                    report.shortfalls.len()
                ));
            }
            Err(e) => {
                let reason = if e.is_configuration_error() { "configuration" } else { "runtime" };
                counter!(names::JOBS_FAILED_TOTAL, "reason" => reason).increment(1);
                logger.log_error(&e.to_string());
            }
        }

        result
    }

    async fn execute(&self, manifest: &JobManifest, logger: &JobLogger) -> WorkerResult<JobReport> {
        logger.log_start(&format!("audio {}", manifest.audio.path.display()));

        let audio = pcm::read_pcm(
            &manifest.audio.path,
            manifest.audio.format,
            manifest.audio.sample_rate,
            manifest.audio.channels,
        )
        .await?;
        let inventory = manifest.inventory()?;
        let engine = AlignmentEngine::new(manifest.engine_config(&self.config));

        logger.log_progress(&format!(
            "{} of audio, {} clip(s)",
            format_seconds(audio.duration_secs()),
            inventory.len()
        ));

        let audio_duration = audio.duration_secs();
        let task = tokio::task::spawn_blocking(move || engine.run(&audio, &inventory));
        let alignment = tokio::time::timeout(self.config.job_timeout, task)
            .await
            .map_err(|_| WorkerError::Timeout(self.config.job_timeout))?
            .map_err(|e| WorkerError::job_failed(format!("Blocking task join error: {}", e)))??;

        for shortfall in &alignment.realigned.shortfalls {
            logger.log_warning(&format!(
                "{} lost {:.3}s of talk audio",
                shortfall.segment_id, shortfall.dropped_secs
            ));
        }

        let output_dir = manifest.output_dir(&self.config);
        tokio::fs::create_dir_all(&output_dir).await?;
        let outputs = JobOutputs::in_dir(output_dir);

        write_json(&outputs.plan, &alignment.plan).await?;
        write_json(&outputs.plan_schema, &schemars::schema_for!(TimelinePlan)).await?;
        pcm::write_f32le(&outputs.realigned_audio, &alignment.realigned.audio).await?;

        let plan = &alignment.plan;
        let report = JobReport {
            job_id: manifest.job_id.clone(),
            completed_at: Utc::now(),
            audio_duration,
            video_duration: plan.total_duration,
            video_length: format_seconds(plan.total_duration),
            thresholds: alignment.analysis.thresholds,
            segments: alignment.analysis.segments.clone(),
            talk_timings: plan.talk_timings.clone(),
            shortfalls: alignment.realigned.shortfalls.clone(),
            final_drift: plan.final_drift(),
            max_drift: plan.max_drift(),
            outputs,
        };
        write_json(&report.outputs.report, &report).await?;

        info!(
            segments = report.segments.len(),
            placements = plan.placements.len(),
            video_secs = report.video_duration,
            final_drift = report.final_drift,
            "Outputs written"
        );

        Ok(report)
    }
}

async fn write_json<T: Serialize>(path: &std::path::Path, value: &T) -> WorkerResult<()> {
    let json = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
