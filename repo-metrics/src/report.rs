//! Markdown report rendering
//!
//! Produces the "Repository Metrics Report" document: title, generation
//! timestamp, the per-repository table, the summary counts and the security
//! scan fractions, always in that order and with fixed label strings so that
//! reports can be diffed and verified.

use crate::config::ReportConfig;
use crate::summary::ReportSummary;
use crate::table::render_table;
use crate::types::{format_timestamp, MetricsOutcome, RepositoryRecord, Result, ScanTool, Timestamp};
use std::fmt::Write as _;
use std::path::Path;

pub const TITLE: &str = "# Repository Metrics Report";
pub const GENERATED_ON_LABEL: &str = "Generated on";
pub const SUMMARY_HEADING: &str = "## Summary";
pub const SCAN_STATUS_HEADING: &str = "## Security Scan Status";

pub const COL_REPOSITORY: &str = "Repository";
pub const COL_OWNER: &str = "Owner";
pub const COL_LAST_COMMIT: &str = "Last Commit";
pub const COL_OPEN_ISSUES: &str = "Open Issues";
pub const COL_LAST_RELEASE: &str = "Last Release";
pub const COL_COMMITS_WEEK: &str = "Commits (Week)";
pub const COL_COMMITS_MONTH: &str = "Commits (Month)";
pub const COL_CONTRIBUTORS: &str = "Contributors";

pub const LABEL_TOTAL_REPOSITORIES: &str = "Total repositories";
pub const LABEL_ACTIVE_LAST_WEEK: &str = "Repositories with commits in the last week";
pub const LABEL_COMMITS_WEEK: &str = "Total commits in the last week";
pub const LABEL_COMMITS_MONTH: &str = "Total commits in the last month";
pub const LABEL_TOTAL_CONTRIBUTORS: &str = "Total contributors across all repositories";
pub const LABEL_PENDING_SCANS: &str = "Repositories pending scan implementation";

pub const NO_COMMITS: &str = "No commits";
pub const NO_RELEASES: &str = "No releases";
pub const ERROR_CELL: &str = "Error";

/// Table columns in output order
pub fn table_headers() -> Vec<&'static str> {
    let mut headers = vec![
        COL_REPOSITORY,
        COL_OWNER,
        COL_LAST_COMMIT,
        COL_OPEN_ISSUES,
        COL_LAST_RELEASE,
        COL_COMMITS_WEEK,
        COL_COMMITS_MONTH,
        COL_CONTRIBUTORS,
    ];
    headers.extend(ScanTool::ALL.iter().map(|tool| tool.label()));
    headers
}

/// Summary label for a scan tool, e.g. "Repositories with Snyk enabled"
pub fn scan_enabled_label(tool: ScanTool) -> String {
    format!("Repositories with {} enabled", tool.label())
}

/// A report ready to be rendered
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub generated_on: Timestamp,
    pub records: Vec<RepositoryRecord>,
}

impl MetricsReport {
    pub fn new(generated_on: Timestamp, records: Vec<RepositoryRecord>) -> Self {
        Self {
            generated_on,
            records,
        }
    }

    pub fn summary(&self) -> Result<ReportSummary> {
        ReportSummary::from_records(&self.records)
    }

    /// Render the complete Markdown document
    pub fn render_markdown(&self, config: &ReportConfig) -> Result<String> {
        let summary = self.summary()?;
        let total = summary.total_repositories;
        let rows: Vec<Vec<String>> = self
            .records
            .iter()
            .map(|record| table_row(record, config))
            .collect();

        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(out, "{}\n", TITLE);
        let _ = writeln!(
            out,
            "{}: {}\n",
            GENERATED_ON_LABEL,
            format_timestamp(&self.generated_on)
        );
        let _ = writeln!(out, "{}\n", render_table(&table_headers(), &rows));

        let _ = writeln!(out, "{}\n", SUMMARY_HEADING);
        let _ = writeln!(out, "{}: {}", LABEL_TOTAL_REPOSITORIES, total);
        let _ = writeln!(out, "{}: {}", LABEL_ACTIVE_LAST_WEEK, summary.active_last_week);
        let _ = writeln!(out, "{}: {}", LABEL_COMMITS_WEEK, summary.commits_last_week);
        let _ = writeln!(out, "{}: {}", LABEL_COMMITS_MONTH, summary.commits_last_month);
        if config.include_contributor_total {
            let _ = writeln!(out, "{}: {}", LABEL_TOTAL_CONTRIBUTORS, summary.total_contributors);
        }

        let _ = writeln!(out, "\n{}\n", SCAN_STATUS_HEADING);
        for tool in ScanTool::ALL {
            let _ = writeln!(
                out,
                "{}: {}/{}",
                scan_enabled_label(tool),
                summary.enabled(tool),
                total
            );
        }
        let _ = writeln!(out, "{}: {}/{}", LABEL_PENDING_SCANS, summary.pending_scans, total);

        Ok(out)
    }

    /// Render and write the report, creating parent directories as needed
    pub fn write_to(&self, path: &Path, config: &ReportConfig) -> Result<()> {
        let text = self.render_markdown(config)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        log::info!("Report generated: {:?}", path);
        Ok(())
    }
}

fn table_row(record: &RepositoryRecord, config: &ReportConfig) -> Vec<String> {
    let hosting = config.hosting_base();
    let name = if config.link_repositories {
        markdown_link(&record.name, &record.repository_url(hosting))
    } else {
        record.name.clone()
    };

    let mut row = vec![name, record.owner.clone()];

    match &record.outcome {
        MetricsOutcome::Collected(metrics) => {
            let contributors = if config.link_contributors {
                markdown_link(
                    &metrics.contributors.to_string(),
                    &record.contributors_url(hosting),
                )
            } else {
                metrics.contributors.to_string()
            };
            row.extend([
                metrics
                    .last_commit
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| NO_COMMITS.to_string()),
                metrics.open_issues.to_string(),
                metrics
                    .last_release
                    .clone()
                    .unwrap_or_else(|| NO_RELEASES.to_string()),
                metrics.commits_week.to_string(),
                metrics.commits_month.to_string(),
                contributors,
            ]);
        }
        MetricsOutcome::Failed { reason } => {
            row.push(format!("{}: {}", ERROR_CELL, reason));
            row.extend(std::iter::repeat(ERROR_CELL.to_string()).take(5));
        }
    }

    row.extend(
        ScanTool::ALL
            .iter()
            .map(|tool| record.scans.get(*tool).to_string()),
    );
    row
}

fn markdown_link(text: &str, url: &str) -> String {
    format!("[{}]({})", text, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{parse_timestamp, LastCommit, RepositoryMetrics, ScanStatus, ScanStatuses};

    fn sample_report() -> MetricsReport {
        let metrics = RepositoryMetrics {
            last_commit: Some(LastCommit {
                timestamp: parse_timestamp("2025-03-14 09:26:53").unwrap(),
                author: "Ada".to_string(),
            }),
            open_issues: 1,
            last_release: None,
            commits_week: 2,
            commits_month: 2,
            contributors: 3,
        };
        MetricsReport::new(
            parse_timestamp("2025-03-15 08:00:00").unwrap(),
            vec![RepositoryRecord::collected(
                "centralrepo",
                "acme",
                ScanStatuses::new(ScanStatus::Enabled, ScanStatus::Disabled, ScanStatus::Enabled),
                metrics,
            )],
        )
    }

    #[test]
    fn test_render_without_links() {
        let text = sample_report().render_markdown(&ReportConfig::new().without_links()).unwrap();
        let expected = "\
# Repository Metrics Report

Generated on: 2025-03-15 08:00:00

| Repository   | Owner   | Last Commit                |   Open Issues | Last Release   |   Commits (Week) |   Commits (Month) |   Contributors | Snyk    | RL       | Semgrep   |
|--------------|---------|----------------------------|---------------|----------------|------------------|-------------------|----------------|---------|----------|-----------|
| centralrepo  | acme    | 2025-03-14 09:26:53 by Ada |             1 | No releases    |                2 |                 2 |              3 | Enabled | Disabled | Enabled   |

## Summary

Total repositories: 1
Repositories with commits in the last week: 1
Total commits in the last week: 2
Total commits in the last month: 2
Total contributors across all repositories: 3

## Security Scan Status

Repositories with Snyk enabled: 1/1
Repositories with RL enabled: 0/1
Repositories with Semgrep enabled: 1/1
Repositories pending scan implementation: 0/1
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_links_and_contributor_total_toggle() {
        let text = sample_report().render_markdown(&ReportConfig::new().with_contributor_total(false))
            .unwrap();
        assert!(text.contains("[centralrepo](https://github.com/acme/centralrepo)"));
        assert!(text.contains("[3](https://github.com/acme/centralrepo/graphs/contributors)"));
        assert!(!text.contains(LABEL_TOTAL_CONTRIBUTORS));
    }

    #[test]
    fn test_failed_row() {
        let report = MetricsReport::new(
            parse_timestamp("2025-03-15 08:00:00").unwrap(),
            vec![RepositoryRecord::failed(
                "gone",
                "acme",
                ScanStatuses::default(),
                "404 Not Found",
            )],
        );
        let text = report.render_markdown(&ReportConfig::new().without_links()).unwrap();
        let row = text.lines().find(|l| l.starts_with("| gone")).unwrap();
        assert!(row.contains("Error: 404 Not Found"));
        assert_eq!(row.matches("| Error ").count(), 5);
        assert!(text.contains("Repositories pending scan implementation: 1/1"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = sample_report();
        let config = ReportConfig::default();
        assert_eq!(
            report.render_markdown(&config).unwrap(),
            report.render_markdown(&config).unwrap()
        );
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/nested/metrics_report.md");
        sample_report().write_to(&path, &ReportConfig::default()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(TITLE));
    }

    #[test]
    fn test_overflowing_totals_are_not_rendered() {
        let mut report = sample_report();
        let mut huge = report.records[0].clone();
        huge.name = "huge".to_string();
        if let MetricsOutcome::Collected(metrics) = &mut huge.outcome {
            metrics.commits_month = u64::MAX;
        }
        report.records.push(huge);

        assert!(matches!(
            report.render_markdown(&ReportConfig::default()),
            Err(crate::types::MetricsError::CountOverflow(_))
        ));
    }
}
