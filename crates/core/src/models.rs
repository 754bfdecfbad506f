use time::UtcDateTime;

use crate::util::short_sha;

/// Timings collected for a single workflow run.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WorkflowRun {
    pub id: u64,
    pub url: String,
    /// Short commit hash, or the branch name for trunk runs.
    pub label: String,
    pub started_at: UtcDateTime,
    pub jobs: Vec<JobTiming>,
}

impl WorkflowRun {
    pub fn new(id: u64, info: &RunInfo) -> Self {
        Self {
            id,
            url: info.html_url.clone(),
            label: short_sha(&info.commit_hash).to_string(),
            started_at: info.started_at,
            jobs: vec![],
        }
    }

    pub fn job(&self, name: &str) -> Option<&JobTiming> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Sum of all collected job durations, in seconds.
    pub fn total_duration(&self) -> u64 { self.jobs.iter().map(|j| j.duration).sum() }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JobTiming {
    pub name: String,
    pub url: String,
    /// Whole seconds.
    pub duration: u64,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Repository {
    pub trunk_branch: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunInfo {
    pub commit_hash: String,
    pub started_at: UtcDateTime,
    pub html_url: String,
    pub workflow_id: u64,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JobInfo {
    pub name: String,
    pub url: String,
    pub started_at: UtcDateTime,
    pub completed_at: Option<UtcDateTime>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunSummary {
    pub id: u64,
    pub head_branch: String,
    pub status: String,
    pub conclusion: Option<String>,
    pub started_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

impl RunSummary {
    /// Whether this run finished successfully on the given branch.
    pub fn succeeded_on(&self, branch: &str) -> bool {
        self.head_branch == branch
            && self.status == "completed"
            && self.conclusion.as_deref() == Some("success")
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Comment {
    pub id: u64,
    pub body: String,
}
