pub mod config;
pub mod models;
pub mod platform;
pub mod util;

/// Problems with the invocation inputs. These are reported before any upstream call is made.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required input: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("No monitored jobs configured")]
    NoJobs,
}

/// Fixed substring used to find the report comment on a pull request.
pub const REPORT_MARKER: &str = "<!-- jobtime report -->";
