use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobtime_core::{
    config::GitHubConfig,
    models::{Comment, JobInfo, Repository, RunInfo, RunSummary},
    platform::Platform,
};
use octocrab::{
    Octocrab,
    models::{CommentId, RunId, workflows},
};
use time::UtcDateTime;

const PER_PAGE: u8 = 100;

/// [`Platform`] backed by the GitHub REST API for a single repository.
#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
    pub owner: String,
    pub repo: String,
}

impl GitHub {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(config.token.clone())
            .build()
            .context("Failed to create GitHub client")?;
        tracing::debug!("Using repository {}/{}", config.owner, config.repo);
        Ok(Self { client, owner: config.owner.clone(), repo: config.repo.clone() })
    }
}

#[async_trait]
impl Platform for GitHub {
    async fn repository(&self) -> Result<Repository> {
        let repo = self
            .client
            .repos(&self.owner, &self.repo)
            .get()
            .await
            .with_context(|| format!("Failed to fetch repository {}/{}", self.owner, self.repo))?;
        let trunk_branch = repo.default_branch.unwrap_or_else(|| "main".to_string());
        Ok(Repository { trunk_branch })
    }

    async fn run(&self, run_id: u64) -> Result<RunInfo> {
        let run = self
            .client
            .workflows(&self.owner, &self.repo)
            .get(RunId(run_id))
            .await
            .with_context(|| format!("Failed to fetch workflow run {run_id}"))?;
        Ok(RunInfo {
            commit_hash: run.head_sha,
            started_at: to_utc(&run.created_at),
            html_url: run.html_url.to_string(),
            workflow_id: run.workflow_id.into_inner(),
        })
    }

    async fn jobs(&self, run_id: u64) -> Result<Vec<JobInfo>> {
        let page = self
            .client
            .workflows(&self.owner, &self.repo)
            .list_jobs(RunId(run_id))
            .per_page(PER_PAGE)
            .send()
            .await
            .with_context(|| format!("Failed to fetch jobs for run {run_id}"))?;
        let jobs = self
            .client
            .all_pages(page)
            .await
            .with_context(|| format!("Failed to fetch jobs for run {run_id}"))?;
        tracing::debug!("Run {} (jobs {})", run_id, jobs.len());
        Ok(jobs.into_iter().map(job_info).collect())
    }

    /// Reads a single page of the newest completed runs on `branch`. A baseline older than
    /// the last [`PER_PAGE`] completed runs on the branch is not found.
    async fn workflow_runs(&self, workflow_id: u64, branch: &str) -> Result<Vec<RunSummary>> {
        let page = self
            .client
            .workflows(&self.owner, &self.repo)
            .list_runs(workflow_id.to_string())
            .branch(branch)
            .status("completed")
            .per_page(PER_PAGE)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {branch} runs for workflow {workflow_id}"))?;
        let count = page.items.len();
        tracing::debug!("Workflow {} ({} completed runs on {})", workflow_id, count, branch);
        Ok(page
            .items
            .into_iter()
            .map(|run| RunSummary {
                id: run.id.into_inner(),
                head_branch: run.head_branch,
                status: run.status,
                conclusion: run.conclusion,
                started_at: to_utc(&run.created_at),
                updated_at: to_utc(&run.updated_at),
            })
            .collect())
    }

    async fn comments(&self, issue_number: u64) -> Result<Vec<Comment>> {
        let page = self
            .client
            .issues(&self.owner, &self.repo)
            .list_comments(issue_number)
            .per_page(PER_PAGE)
            .send()
            .await
            .with_context(|| format!("Failed to fetch comments for #{issue_number}"))?;
        let comments = self
            .client
            .all_pages(page)
            .await
            .with_context(|| format!("Failed to fetch comments for #{issue_number}"))?;
        Ok(comments
            .into_iter()
            .map(|c| Comment { id: c.id.into_inner(), body: c.body.unwrap_or_default() })
            .collect())
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<Comment> {
        let comment = self
            .client
            .issues(&self.owner, &self.repo)
            .create_comment(issue_number, body)
            .await
            .context("Failed to create comment")?;
        Ok(Comment { id: comment.id.into_inner(), body: comment.body.unwrap_or_default() })
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        self.client
            .issues(&self.owner, &self.repo)
            .update_comment(CommentId(comment_id), body)
            .await
            .context("Failed to update existing comment")?;
        Ok(())
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        self.client
            .issues(&self.owner, &self.repo)
            .delete_comment(CommentId(comment_id))
            .await
            .with_context(|| format!("Failed to delete comment {comment_id}"))?;
        Ok(())
    }
}

fn job_info(job: workflows::Job) -> JobInfo {
    JobInfo {
        name: job.name,
        url: job.html_url.to_string(),
        started_at: to_utc(&job.started_at),
        completed_at: job.completed_at.as_ref().map(to_utc),
    }
}

fn to_utc(value: &DateTime<Utc>) -> UtcDateTime {
    UtcDateTime::from_unix_timestamp_nanos(i128::from(value.timestamp_millis()) * 1_000_000)
        .unwrap_or(UtcDateTime::UNIX_EPOCH)
}
