use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Everything the report pipeline needs for one invocation. Built once by the run locator
/// and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub trunk_branch: String,
    pub pull_request: u64,
    pub workflow_id: u64,
    pub run_id: u64,
    /// Monitored job names, in display order.
    pub jobs: Vec<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub style: ReportStyle,
    /// Number of additional trunk runs to show after the baseline.
    #[serde(default)]
    pub history: usize,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish()
    }
}

impl GitHubConfig {
    /// Builds the config from an `owner/repo` slug, as found in `GITHUB_REPOSITORY`.
    pub fn from_slug(token: String, slug: &str) -> Result<Self, ConfigError> {
        match slug.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self { token, owner: owner.to_string(), repo: repo.to_string() })
            }
            _ => Err(ConfigError::Invalid { name: "repository", value: slug.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    #[default]
    Table,
    Narrative,
}

impl ReportStyle {
    pub const fn variants() -> &'static [Self] { &[Self::Table, Self::Narrative] }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Narrative => "narrative",
        }
    }
}

impl FromStr for ReportStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "table" => Ok(Self::Table),
            "narrative" => Ok(Self::Narrative),
            _ => Err(ConfigError::Invalid { name: "style", value: s.to_string() }),
        }
    }
}

impl fmt::Display for ReportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Parse a newline-delimited job list, dropping blank lines and surrounding whitespace.
pub fn parse_job_list(input: &str) -> Vec<String> {
    let mut jobs = Vec::new();
    for line in input.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !jobs.iter().any(|j| j == line) {
            jobs.push(line.to_string());
        }
    }
    jobs
}
