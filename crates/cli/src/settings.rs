use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use argp::FromArgs;
use jobtime_core::{
    ConfigError,
    config::{GitHubConfig, ReportStyle, parse_job_list},
};
use jobtime_report::locate::Invocation;
use serde::Deserialize;

#[derive(FromArgs, PartialEq, Eq, Debug, Default)]
/// Compare job durations of a pull request run against the trunk branch and post the result
/// as a pull request comment.
pub struct Args {
    #[argp(option)]
    /// YAML file with default settings
    pub config: Option<PathBuf>,
    #[argp(option)]
    /// GitHub token (default: $INPUT_TOKEN, then $GITHUB_TOKEN)
    pub token: Option<String>,
    #[argp(option)]
    /// newline-delimited job names to monitor
    pub jobs: Option<String>,
    #[argp(option)]
    /// message shown above the report
    pub message: Option<String>,
    #[argp(option)]
    /// report style: table or narrative
    pub style: Option<String>,
    #[argp(option)]
    /// number of older trunk runs to include
    pub history: Option<usize>,
    #[argp(switch)]
    /// print the report instead of posting it
    pub dry_run: bool,
}

/// Settings read from the `--config` file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub token: Option<String>,
    pub jobs: Option<JobList>,
    pub message: Option<String>,
    pub style: Option<ReportStyle>,
    pub history: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JobList {
    Lines(String),
    List(Vec<String>),
}

impl JobList {
    fn into_jobs(self) -> Vec<String> {
        match self {
            Self::Lines(lines) => parse_job_list(&lines),
            Self::List(list) => parse_job_list(&list.join("\n")),
        }
    }
}

pub fn load_file(path: &Path) -> Result<FileSettings> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file {}", path.display()))?;
    serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

#[derive(Debug)]
pub struct Settings {
    pub github: GitHubConfig,
    pub invocation: Invocation,
    pub dry_run: bool,
}

/// Merge command-line flags, environment and config file, in that order of precedence.
pub fn resolve(
    args: Args,
    file: FileSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let token = args
        .token
        .or_else(|| non_empty("INPUT_TOKEN"))
        .or_else(|| non_empty("GITHUB_TOKEN"))
        .or(file.token)
        .ok_or(ConfigError::Missing("token"))?;
    let repository =
        non_empty("GITHUB_REPOSITORY").ok_or(ConfigError::Missing("GITHUB_REPOSITORY"))?;
    let github = GitHubConfig::from_slug(token, repository.trim())?;

    let jobs = match args.jobs.or_else(|| non_empty("INPUT_JOBS")) {
        Some(lines) => parse_job_list(&lines),
        None => file.jobs.ok_or(ConfigError::Missing("jobs"))?.into_jobs(),
    };
    if jobs.is_empty() {
        return Err(ConfigError::NoJobs.into());
    }
    let message = args.message.or_else(|| non_empty("INPUT_MESSAGE")).or(file.message);
    let style = match args.style.or_else(|| non_empty("INPUT_STYLE")) {
        Some(style) => style.parse()?,
        None => file.style.unwrap_or_default(),
    };
    let history = match args.history {
        Some(history) => history,
        None => match non_empty("INPUT_HISTORY") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "history", value })?,
            None => file.history.unwrap_or(0),
        },
    };

    let run_id = non_empty("GITHUB_RUN_ID").ok_or(ConfigError::Missing("GITHUB_RUN_ID"))?;
    let run_id = run_id
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name: "GITHUB_RUN_ID", value: run_id.clone() })?;
    let pull_request = pull_request_number(&env)?;

    Ok(Settings {
        github,
        invocation: Invocation { run_id, pull_request, jobs, message, style, history },
        dry_run: args.dry_run,
    })
}

/// Pull request number from the event payload, falling back to `GITHUB_REF`.
fn pull_request_number(env: &impl Fn(&str) -> Option<String>) -> Result<Option<u64>> {
    if let Some(path) = env("GITHUB_EVENT_PATH").filter(|p| !p.is_empty()) {
        let data = std::fs::read(&path)
            .with_context(|| format!("Failed to read event payload {path}"))?;
        let event: serde_json::Value = serde_json::from_slice(&data)
            .with_context(|| format!("Failed to parse event payload {path}"))?;
        if let Some(number) = event.pointer("/pull_request/number").and_then(|n| n.as_u64()) {
            return Ok(Some(number));
        }
    }
    Ok(env("GITHUB_REF").as_deref().and_then(parse_pr_ref))
}

/// Parse `refs/pull/<number>/merge` (or `/head`).
fn parse_pr_ref(value: &str) -> Option<u64> {
    let rest = value.strip_prefix("refs/pull/")?;
    let (number, _) = rest.split_once('/')?;
    number.parse().ok()
}
