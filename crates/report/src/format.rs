use std::fmt::Write;

use jobtime_core::{
    REPORT_MARKER,
    config::{Config, ReportStyle},
    models::WorkflowRun,
    util::format_duration,
};

/// Change in overall duration relative to the baseline, most severe regression first.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    RegressedSeverely,
    RegressedABit,
    RegressedSlightly,
    ImprovedSlightly,
    ImprovedALot,
    ImprovedSignificantly,
}

impl Severity {
    /// Boundary values fall on the less severe side, i.e. the bound closer to zero.
    pub fn from_percent(percent: f64) -> Self {
        if percent > 50.0 {
            Self::RegressedSeverely
        } else if percent > 20.0 {
            Self::RegressedABit
        } else if percent > 0.0 {
            Self::RegressedSlightly
        } else if percent >= -20.0 {
            Self::ImprovedSlightly
        } else if percent >= -50.0 {
            Self::ImprovedALot
        } else {
            Self::ImprovedSignificantly
        }
    }

    pub fn tier(self) -> u8 { self as u8 + 1 }

    pub fn wording(self) -> &'static str {
        match self {
            Self::RegressedSeverely => "regressed severely",
            Self::RegressedABit => "regressed a bit",
            Self::RegressedSlightly => "regressed slightly",
            Self::ImprovedSlightly => "improved slightly",
            Self::ImprovedALot => "improved a lot",
            Self::ImprovedSignificantly => "improved significantly",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::RegressedSeverely => "🚨",
            Self::RegressedABit => "🐢",
            Self::RegressedSlightly => "📈",
            Self::ImprovedSlightly => "📉",
            Self::ImprovedALot => "⚡",
            Self::ImprovedSignificantly => "🚀",
        }
    }
}

/// Signed change from `baseline` to `current` in percent, or `None` for a zero baseline.
pub fn percent_change(baseline: u64, current: u64) -> Option<f64> {
    if baseline == 0 {
        return None;
    }
    Some((current as f64 - baseline as f64) * 100.0 / baseline as f64)
}

/// Build the full comment body in the configured style.
pub fn generate_report(
    config: &Config,
    current: &WorkflowRun,
    baseline: Option<&WorkflowRun>,
    history: &[WorkflowRun],
) -> String {
    let mut out = format!("{REPORT_MARKER}\n### Job durations\n\n");
    if let Some(message) = config.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        out.push_str(message);
        out.push_str("\n\n");
    }
    match config.style {
        ReportStyle::Table => {
            let runs = baseline.into_iter().chain(std::iter::once(current)).chain(history);
            generate_table(&config.jobs, runs, &mut out);
        }
        ReportStyle::Narrative => {
            generate_narrative(current, baseline, &config.trunk_branch, &mut out);
        }
    }
    out
}

/// One row per run, one column per monitored job in configured order.
pub fn generate_table<'a>(
    jobs: &[String],
    runs: impl IntoIterator<Item = &'a WorkflowRun>,
    out: &mut String,
) {
    out.push_str("| Run |");
    for job in jobs {
        let _ = write!(out, " {} |", escape_cell(job));
    }
    out.push_str("\n| - |");
    for _ in jobs {
        out.push_str(" - |");
    }
    out.push('\n');
    for run in runs {
        let _ = write!(out, "| [{}]({}) |", escape_cell(&run.label), run.url);
        for job in jobs {
            match run.job(job) {
                Some(timing) => {
                    let _ = write!(
                        out,
                        " [{}]({}) |",
                        format_duration(timing.duration as i64),
                        timing.url
                    );
                }
                None => out.push_str(" - |"),
            }
        }
        out.push('\n');
    }
}

/// A single sentence comparing overall duration against the baseline.
pub fn generate_narrative(
    current: &WorkflowRun,
    baseline: Option<&WorkflowRun>,
    trunk_branch: &str,
    out: &mut String,
) {
    let current_total = current.total_duration();
    let Some(baseline) = baseline else {
        let _ = writeln!(
            out,
            "⏱️ The monitored jobs took {} in [{}]({}). No successful `{}` run was found to \
             compare against.",
            format_duration(current_total as i64),
            current.label,
            current.url,
            trunk_branch
        );
        return;
    };
    let baseline_total = baseline.total_duration();
    let Some(percent) = percent_change(baseline_total, current_total) else {
        let _ = writeln!(
            out,
            "⏱️ The monitored jobs took {} in [{}]({}). The [`{}`]({}) run has no completed \
             monitored jobs to compare against.",
            format_duration(current_total as i64),
            current.label,
            current.url,
            trunk_branch,
            baseline.url
        );
        return;
    };
    let severity = Severity::from_percent(percent);
    let diff = current_total as i64 - baseline_total as i64;
    let _ = writeln!(
        out,
        "{} Job durations **{}**: {} in [{}]({}), {} {} than [`{}`]({}) from {} ({}, {:+.1}%).",
        severity.emoji(),
        severity.wording(),
        format_duration(current_total as i64),
        current.label,
        current.url,
        format_duration(diff),
        if diff > 0 { "slower" } else { "faster" },
        trunk_branch,
        baseline.url,
        baseline.started_at.date(),
        format_duration(baseline_total as i64),
        percent
    );
}

fn escape_cell(value: &str) -> String { value.replace('|', "\\|") }

#[cfg(test)]
mod tests {
    use jobtime_core::models::JobTiming;
    use time::UtcDateTime;

    use super::*;

    fn run(id: u64, label: &str, jobs: &[(&str, u64)]) -> WorkflowRun {
        WorkflowRun {
            id,
            url: format!("https://example.com/run/{id}"),
            label: label.to_string(),
            started_at: UtcDateTime::UNIX_EPOCH,
            jobs: jobs
                .iter()
                .map(|&(name, duration)| JobTiming {
                    name: name.to_string(),
                    url: format!("https://example.com/run/{id}/{name}"),
                    duration,
                })
                .collect(),
        }
    }

    fn config(style: ReportStyle, message: Option<&str>) -> Config {
        Config {
            trunk_branch: "main".to_string(),
            pull_request: 1,
            workflow_id: 2,
            run_id: 3,
            jobs: vec!["test".to_string(), "build".to_string()],
            message: message.map(str::to_string),
            style,
            history: 0,
        }
    }

    #[test]
    fn test_severity_boundaries() {
        let cases: &[(f64, &str)] = &[
            (200.0, "regressed severely"),
            (50.01, "regressed severely"),
            (50.0, "regressed a bit"),
            (20.01, "regressed a bit"),
            (20.0, "regressed slightly"),
            (0.01, "regressed slightly"),
            (0.0, "improved slightly"),
            (-19.99, "improved slightly"),
            (-20.0, "improved slightly"),
            (-20.01, "improved a lot"),
            (-49.99, "improved a lot"),
            (-50.0, "improved a lot"),
            (-50.01, "improved significantly"),
            (-100.0, "improved significantly"),
        ];
        for &(percent, expected) in cases {
            assert_eq!(Severity::from_percent(percent).wording(), expected, "percent {percent}");
        }
    }

    #[test]
    fn test_severity_tiers() {
        assert_eq!(Severity::from_percent(51.0).tier(), 1);
        assert_eq!(Severity::from_percent(-51.0).tier(), 6);
        let mut tiers: Vec<_> = (-120..=120).map(|p| Severity::from_percent(p as f64)).collect();
        tiers.dedup();
        assert_eq!(tiers.len(), 6);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(100, 150), Some(50.0));
        assert_eq!(percent_change(200, 100), Some(-50.0));
        assert_eq!(percent_change(60, 60), Some(0.0));
        assert_eq!(percent_change(0, 10), None);
    }

    #[test]
    fn test_table() {
        let baseline = run(1, "main", &[("build", 61), ("test", 30)]);
        let current = run(2, "abcdef0", &[("build", 125)]);
        let report = generate_report(
            &config(ReportStyle::Table, Some("Timings for this PR")),
            &current,
            Some(&baseline),
            &[],
        );
        let expected = "<!-- jobtime report -->\n### Job durations\n\nTimings for this PR\n\n\
            | Run | test | build |\n\
            | - | - | - |\n\
            | [main](https://example.com/run/1) | [30s](https://example.com/run/1/test) | \
            [1min 1s](https://example.com/run/1/build) |\n\
            | [abcdef0](https://example.com/run/2) | - | \
            [2mins 5s](https://example.com/run/2/build) |\n";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_table_without_baseline() {
        let current = run(2, "abcdef0", &[("test", 5)]);
        let history = [run(9, "1234567", &[("test", 4)])];
        let report = generate_report(&config(ReportStyle::Table, None), &current, None, &history);
        let rows: Vec<_> = report.lines().filter(|l| l.starts_with("| [")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("| [abcdef0]"));
        assert!(rows[1].starts_with("| [1234567]"));
        assert!(report.contains(REPORT_MARKER));
    }

    #[test]
    fn test_narrative() {
        let baseline = run(1, "main", &[("build", 60), ("test", 40)]);
        let current = run(2, "abcdef0", &[("build", 100), ("test", 60)]);
        let report =
            generate_report(&config(ReportStyle::Narrative, None), &current, Some(&baseline), &[]);
        assert!(report.contains("🚨 Job durations **regressed severely**"), "{report}");
        assert!(report.contains("2mins 40s in [abcdef0](https://example.com/run/2)"), "{report}");
        assert!(report.contains("1min 0s slower than [`main`]"), "{report}");
        let compared = "[`main`](https://example.com/run/1) from 1970-01-01 (1min 40s, +60.0%)";
        assert!(report.contains(compared), "{report}");
    }

    #[test]
    fn test_narrative_improvement_has_no_minus_sign() {
        let baseline = run(1, "main", &[("test", 200)]);
        let current = run(2, "abcdef0", &[("test", 100)]);
        let mut out = String::new();
        generate_narrative(&current, Some(&baseline), "main", &mut out);
        assert!(out.contains("**improved a lot**"), "{out}");
        assert!(out.contains("1min 40s faster"), "{out}");
        assert!(out.contains("-50.0%"), "{out}");
        assert!(!out.contains("-1min"), "{out}");
    }

    #[test]
    fn test_narrative_without_baseline() {
        let current = run(2, "abcdef0", &[("test", 5)]);
        let mut out = String::new();
        generate_narrative(&current, None, "main", &mut out);
        assert!(out.contains("No successful `main` run"), "{out}");

        let empty = run(1, "main", &[]);
        let mut out = String::new();
        generate_narrative(&current, Some(&empty), "main", &mut out);
        assert!(out.contains("no completed monitored jobs"), "{out}");
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("test (linux)"), "test (linux)");
    }
}
