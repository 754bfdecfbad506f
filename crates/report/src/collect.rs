use anyhow::{Context, Result};
use jobtime_core::{
    models::{JobInfo, JobTiming, WorkflowRun},
    platform::Platform,
};
use time::UtcDateTime;

/// Monitored job timings extracted from a run's job list.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Timings {
    pub jobs: Vec<JobTiming>,
    /// Monitored jobs without a completion time (still running, or cancelled).
    pub incomplete: Vec<String>,
}

/// Fetch a run and compute durations for its monitored jobs.
///
/// Jobs that have not completed are skipped with a warning. A run with no matching jobs is
/// still returned, with an empty job list.
pub async fn collect_run(
    platform: &dyn Platform,
    run_id: u64,
    monitored: &[String],
) -> Result<WorkflowRun> {
    let info = platform.run(run_id).await.context("Failed to fetch run metadata")?;
    let available = platform.jobs(run_id).await.context("Failed to fetch run jobs")?;
    let Timings { jobs, incomplete } = extract_timings(monitored, &available);
    for name in &incomplete {
        tracing::warn!("Job {} in run {} has not completed, skipping", name, run_id);
    }
    if jobs.is_empty() {
        let names = available.iter().map(|j| j.name.as_str()).collect::<Vec<_>>().join(", ");
        tracing::warn!(
            "No monitored jobs found in run {} (monitored: {}; available: {})",
            run_id,
            monitored.join(", "),
            names
        );
    }
    tracing::debug!("Run {} ({}) (jobs {})", run_id, info.commit_hash, jobs.len());
    let mut run = WorkflowRun::new(run_id, &info);
    run.jobs = jobs;
    Ok(run)
}

pub fn extract_timings(monitored: &[String], available: &[JobInfo]) -> Timings {
    let mut timings = Timings::default();
    for job in available {
        if !monitored.contains(&job.name) || timings.jobs.iter().any(|j| j.name == job.name) {
            continue;
        }
        let Some(completed_at) = job.completed_at else {
            if !timings.incomplete.contains(&job.name) {
                timings.incomplete.push(job.name.clone());
            }
            continue;
        };
        timings.jobs.push(JobTiming {
            name: job.name.clone(),
            url: job.url.clone(),
            duration: job_duration(job.started_at, completed_at),
        });
    }
    // A later attempt of the same job may have completed.
    timings.incomplete.retain(|name| !timings.jobs.iter().any(|j| &j.name == name));
    timings
}

/// Elapsed time rounded to whole seconds, never negative.
pub fn job_duration(started_at: UtcDateTime, completed_at: UtcDateTime) -> u64 {
    let seconds = (completed_at - started_at).as_seconds_f64().round();
    if seconds > 0.0 { seconds as u64 } else { 0 }
}
