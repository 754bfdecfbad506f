use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Comment, JobInfo, Repository, RunInfo, RunSummary};

/// The subset of the CI platform API used to build and publish reports.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn repository(&self) -> Result<Repository>;

    async fn run(&self, run_id: u64) -> Result<RunInfo>;

    /// All jobs of a run, across every page.
    async fn jobs(&self, run_id: u64) -> Result<Vec<JobInfo>>;

    /// Completed runs of a workflow on `branch`, newest first. Callers rely on this ordering.
    async fn workflow_runs(&self, workflow_id: u64, branch: &str) -> Result<Vec<RunSummary>>;

    async fn comments(&self, issue_number: u64) -> Result<Vec<Comment>>;

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<Comment>;

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<()>;

    async fn delete_comment(&self, comment_id: u64) -> Result<()>;
}

pub mod memory {
    //! In-memory [`Platform`] for tests.

    use std::collections::HashMap;

    use anyhow::{Result, anyhow, bail};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::Platform;
    use crate::models::{Comment, JobInfo, Repository, RunInfo, RunSummary};

    /// A recorded call against the platform.
    #[derive(Debug, Clone, Eq, PartialEq)]
    pub enum Call {
        Repository,
        Run(u64),
        Jobs(u64),
        WorkflowRuns(u64, String),
        Comments(u64),
        CreateComment(u64),
        UpdateComment(u64),
        DeleteComment(u64),
    }

    pub struct MemoryPlatform {
        repository: Repository,
        runs: HashMap<u64, RunInfo>,
        jobs: HashMap<u64, Vec<JobInfo>>,
        workflow_runs: HashMap<u64, Vec<RunSummary>>,
        state: Mutex<State>,
    }

    #[derive(Default)]
    struct State {
        // (issue number, comment), in creation order
        comments: Vec<(u64, Comment)>,
        next_comment_id: u64,
        calls: Vec<Call>,
    }

    impl MemoryPlatform {
        pub fn new(trunk_branch: &str) -> Self {
            Self {
                repository: Repository { trunk_branch: trunk_branch.to_string() },
                runs: HashMap::new(),
                jobs: HashMap::new(),
                workflow_runs: HashMap::new(),
                state: Mutex::new(State { next_comment_id: 1, ..Default::default() }),
            }
        }

        pub fn with_run(mut self, run_id: u64, info: RunInfo, jobs: Vec<JobInfo>) -> Self {
            self.runs.insert(run_id, info);
            self.jobs.insert(run_id, jobs);
            self
        }

        pub fn with_workflow_runs(mut self, workflow_id: u64, runs: Vec<RunSummary>) -> Self {
            self.workflow_runs.insert(workflow_id, runs);
            self
        }

        pub fn with_comment(mut self, issue_number: u64, body: &str) -> Self {
            let state = self.state.get_mut();
            let id = state.next_comment_id;
            state.next_comment_id += 1;
            state.comments.push((issue_number, Comment { id, body: body.to_string() }));
            self
        }

        pub async fn calls(&self) -> Vec<Call> { self.state.lock().await.calls.clone() }

        pub async fn comments_on(&self, issue_number: u64) -> Vec<Comment> {
            let state = self.state.lock().await;
            state
                .comments
                .iter()
                .filter(|(n, _)| *n == issue_number)
                .map(|(_, c)| c.clone())
                .collect()
        }

        async fn record(&self, call: Call) { self.state.lock().await.calls.push(call); }
    }

    #[async_trait]
    impl Platform for MemoryPlatform {
        async fn repository(&self) -> Result<Repository> {
            self.record(Call::Repository).await;
            Ok(self.repository.clone())
        }

        async fn run(&self, run_id: u64) -> Result<RunInfo> {
            self.record(Call::Run(run_id)).await;
            self.runs.get(&run_id).cloned().ok_or_else(|| anyhow!("Run {run_id} not found"))
        }

        async fn jobs(&self, run_id: u64) -> Result<Vec<JobInfo>> {
            self.record(Call::Jobs(run_id)).await;
            self.jobs.get(&run_id).cloned().ok_or_else(|| anyhow!("Run {run_id} not found"))
        }

        async fn workflow_runs(&self, workflow_id: u64, branch: &str) -> Result<Vec<RunSummary>> {
            self.record(Call::WorkflowRuns(workflow_id, branch.to_string())).await;
            let runs = self.workflow_runs.get(&workflow_id).map(Vec::as_slice).unwrap_or_default();
            Ok(runs.iter().filter(|run| run.head_branch == branch).cloned().collect())
        }

        async fn comments(&self, issue_number: u64) -> Result<Vec<Comment>> {
            self.record(Call::Comments(issue_number)).await;
            Ok(self.comments_on(issue_number).await)
        }

        async fn create_comment(&self, issue_number: u64, body: &str) -> Result<Comment> {
            let mut state = self.state.lock().await;
            state.calls.push(Call::CreateComment(issue_number));
            let comment = Comment { id: state.next_comment_id, body: body.to_string() };
            state.next_comment_id += 1;
            state.comments.push((issue_number, comment.clone()));
            Ok(comment)
        }

        async fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
            let mut state = self.state.lock().await;
            state.calls.push(Call::UpdateComment(comment_id));
            match state.comments.iter_mut().find(|(_, c)| c.id == comment_id) {
                Some((_, comment)) => {
                    comment.body = body.to_string();
                    Ok(())
                }
                None => bail!("Comment {comment_id} not found"),
            }
        }

        async fn delete_comment(&self, comment_id: u64) -> Result<()> {
            let mut state = self.state.lock().await;
            state.calls.push(Call::DeleteComment(comment_id));
            let before = state.comments.len();
            state.comments.retain(|(_, c)| c.id != comment_id);
            if state.comments.len() == before {
                bail!("Comment {comment_id} not found");
            }
            Ok(())
        }
    }
}
