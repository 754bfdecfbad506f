use anyhow::{Context, Result};
use jobtime_core::{
    ConfigError,
    config::{Config, ReportStyle},
    platform::Platform,
};

/// Raw invocation inputs, before anything is fetched.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub run_id: u64,
    pub pull_request: Option<u64>,
    pub jobs: Vec<String>,
    pub message: Option<String>,
    pub style: ReportStyle,
    pub history: usize,
}

#[derive(Debug)]
pub enum Located {
    PullRequest(Config),
    /// Not triggered by a pull request; there is nothing to report on.
    NotPullRequest,
}

/// Resolve the workflow and trunk branch for the current run.
pub async fn locate(platform: &dyn Platform, invocation: Invocation) -> Result<Located> {
    if invocation.jobs.is_empty() {
        return Err(ConfigError::NoJobs.into());
    }
    let Some(pull_request) = invocation.pull_request else {
        return Ok(Located::NotPullRequest);
    };
    let run = platform.run(invocation.run_id).await.context("Failed to fetch current run")?;
    let repository = platform.repository().await.context("Failed to fetch repository")?;
    tracing::info!(
        "Run {} (workflow {}) on #{}, comparing against {}",
        invocation.run_id,
        run.workflow_id,
        pull_request,
        repository.trunk_branch
    );
    Ok(Located::PullRequest(Config {
        trunk_branch: repository.trunk_branch,
        pull_request,
        workflow_id: run.workflow_id,
        run_id: invocation.run_id,
        jobs: invocation.jobs,
        message: invocation.message.filter(|m| !m.trim().is_empty()),
        style: invocation.style,
        history: invocation.history,
    }))
}
