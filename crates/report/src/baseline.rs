use anyhow::{Context, Result};
use jobtime_core::{
    config::Config,
    models::{RunSummary, WorkflowRun},
    platform::Platform,
};

use crate::collect::collect_run;

/// Runs on the trunk branch to compare against.
#[derive(Debug, Default)]
pub struct TrunkRuns {
    /// Most recent successful trunk run, labelled with the branch name.
    pub baseline: Option<WorkflowRun>,
    /// Older successful trunk runs, newest first.
    pub history: Vec<WorkflowRun>,
}

/// Successful runs on `trunk_branch`, in feed order. The feed is trusted to be newest first.
pub fn successful_trunk_runs<'a>(
    runs: &'a [RunSummary],
    trunk_branch: &'a str,
) -> impl Iterator<Item = &'a RunSummary> + 'a {
    runs.iter().filter(move |run| run.succeeded_on(trunk_branch))
}

pub fn select_baseline<'a>(runs: &'a [RunSummary], trunk_branch: &str) -> Option<&'a RunSummary> {
    runs.iter().find(|run| run.succeeded_on(trunk_branch))
}

/// Find the baseline run (and `config.history` older runs) and collect their timings.
pub async fn collect_trunk_runs(platform: &dyn Platform, config: &Config) -> Result<TrunkRuns> {
    let runs = platform
        .workflow_runs(config.workflow_id, &config.trunk_branch)
        .await
        .context("Failed to fetch workflow runs")?;
    let Some(baseline) = select_baseline(&runs, &config.trunk_branch) else {
        tracing::warn!(
            "No successful {} run found for workflow {} ({} runs checked)",
            config.trunk_branch,
            config.workflow_id,
            runs.len()
        );
        return Ok(TrunkRuns::default());
    };
    tracing::info!(
        "Using run {} on {} as baseline (started {}, finished {})",
        baseline.id,
        config.trunk_branch,
        baseline.started_at,
        baseline.updated_at
    );
    let mut baseline = collect_run(platform, baseline.id, &config.jobs)
        .await
        .with_context(|| format!("Failed to collect baseline run {}", baseline.id))?;
    baseline.label = config.trunk_branch.clone();

    let mut history = Vec::new();
    let older = successful_trunk_runs(&runs, &config.trunk_branch).skip(1).take(config.history);
    for summary in older {
        let run = collect_run(platform, summary.id, &config.jobs)
            .await
            .with_context(|| format!("Failed to collect trunk run {}", summary.id))?;
        history.push(run);
    }
    Ok(TrunkRuns { baseline: Some(baseline), history })
}
