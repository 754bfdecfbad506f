pub mod baseline;
pub mod collect;
pub mod comment;
pub mod format;
pub mod locate;

use anyhow::Result;
use jobtime_core::{config::Config, platform::Platform};

use crate::{
    baseline::collect_trunk_runs,
    collect::collect_run,
    comment::{Published, post_pr_comment},
    format::generate_report,
};

/// Result of a report run.
#[derive(Debug)]
pub struct Outcome {
    pub report: String,
    /// `None` when publishing was skipped.
    pub published: Option<Published>,
}

/// Collect timings for the current run and the trunk baseline, then build the report and
/// (optionally) publish it to the pull request.
///
/// Nothing is written to the pull request unless the full report was assembled.
pub async fn run(platform: &dyn Platform, config: &Config, publish: bool) -> Result<Outcome> {
    tracing::info!(
        "Processing run {} for #{} (jobs: {})",
        config.run_id,
        config.pull_request,
        config.jobs.join(", ")
    );
    let (current, trunk) = tokio::try_join!(
        collect_run(platform, config.run_id, &config.jobs),
        collect_trunk_runs(platform, config),
    )?;
    if trunk.baseline.is_none() {
        tracing::warn!("No baseline available, reporting current run only");
    }
    let report = generate_report(config, &current, trunk.baseline.as_ref(), &trunk.history);
    let published = if publish {
        Some(post_pr_comment(platform, config.pull_request, &report).await?)
    } else {
        None
    };
    Ok(Outcome { report, published })
}

#[cfg(test)]
mod tests {
    use jobtime_core::{
        REPORT_MARKER,
        config::ReportStyle,
        models::{JobInfo, RunInfo, RunSummary},
        platform::memory::{Call, MemoryPlatform},
    };
    use time::UtcDateTime;

    use super::*;

    fn at(seconds: i64) -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(1_700_000_000 + seconds).unwrap()
    }

    fn run_info(sha: &str, id: u64) -> RunInfo {
        RunInfo {
            commit_hash: sha.to_string(),
            started_at: at(0),
            html_url: format!("https://example.com/run/{id}"),
            workflow_id: 9,
        }
    }

    fn job(name: &str, completed: Option<i64>) -> JobInfo {
        JobInfo {
            name: name.to_string(),
            url: format!("https://example.com/job/{name}"),
            started_at: at(0),
            completed_at: completed.map(at),
        }
    }

    fn config(style: ReportStyle) -> Config {
        Config {
            trunk_branch: "main".to_string(),
            pull_request: 3,
            workflow_id: 9,
            run_id: 20,
            jobs: vec!["build".to_string(), "test".to_string()],
            message: None,
            style,
            history: 0,
        }
    }

    fn platform() -> MemoryPlatform {
        let trunk = RunSummary {
            id: 10,
            head_branch: "main".to_string(),
            status: "completed".to_string(),
            conclusion: Some("success".to_string()),
            started_at: at(-600),
            updated_at: at(-300),
        };
        MemoryPlatform::new("main")
            .with_workflow_runs(9, vec![trunk])
            .with_run(
                10,
                run_info("1010101010", 10),
                vec![job("build", Some(60)), job("test", Some(30))],
            )
            .with_run(
                20,
                run_info("2020202020", 20),
                vec![job("build", Some(90)), job("test", None)],
            )
    }

    #[tokio::test]
    async fn test_run_publishes_table() {
        let platform = platform();
        let outcome = run(&platform, &config(ReportStyle::Table), true).await.unwrap();
        assert_eq!(outcome.published, Some(Published::Created(1)));
        assert!(outcome.report.contains("| Run | build | test |"));
        assert!(outcome.report.contains("| [main](https://example.com/run/10) | [1min 0s]"));
        assert!(outcome.report.contains("| [2020202](https://example.com/run/20) | [1min 30s]"));
        let current_row = outcome.report.lines().find(|l| l.starts_with("| [2020202]")).unwrap();
        assert!(current_row.ends_with("| - |"), "{current_row}");

        let comments = platform.comments_on(3).await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, outcome.report);

        let again = run(&platform, &config(ReportStyle::Table), true).await.unwrap();
        assert_eq!(again.published, Some(Published::Updated(1)));
        assert_eq!(platform.comments_on(3).await.len(), 1);
    }

    #[tokio::test]
    async fn test_run_without_publish() {
        let platform = platform();
        let outcome = run(&platform, &config(ReportStyle::Narrative), false).await.unwrap();
        assert_eq!(outcome.published, None);
        assert!(outcome.report.starts_with(REPORT_MARKER));
        assert!(outcome.report.contains("**improved slightly**"), "{}", outcome.report);
        let calls = platform.calls().await;
        assert!(!calls.iter().any(|c| matches!(c, Call::Comments(_) | Call::CreateComment(_))));
    }

    #[tokio::test]
    async fn test_upstream_failure_publishes_nothing() {
        let platform = MemoryPlatform::new("main");
        assert!(run(&platform, &config(ReportStyle::Table), true).await.is_err());
        assert!(platform.comments_on(3).await.is_empty());
    }
}
