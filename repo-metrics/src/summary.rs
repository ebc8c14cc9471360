//! Summary aggregation over report records

use crate::types::{MetricsError, RepositoryRecord, Result, ScanStatus, ScanTool};

/// Aggregated counts shown in the "Summary" and "Security Scan Status" sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_repositories: usize,
    /// Repositories with at least one commit in the trailing week
    pub active_last_week: usize,
    pub commits_last_week: u64,
    pub commits_last_month: u64,
    pub total_contributors: u64,
    pub snyk_enabled: usize,
    pub rl_enabled: usize,
    pub semgrep_enabled: usize,
    /// Repositories with at least one tool pending implementation
    pub pending_scans: usize,
}

impl ReportSummary {
    /// Fails with `CountOverflow` if a total does not fit in a u64
    pub fn from_records(records: &[RepositoryRecord]) -> Result<Self> {
        let mut summary = ReportSummary {
            total_repositories: records.len(),
            ..Default::default()
        };

        for record in records {
            if let Some(metrics) = record.metrics() {
                if metrics.commits_week > 0 {
                    summary.active_last_week += 1;
                }
                summary.commits_last_week = add_count(
                    summary.commits_last_week,
                    metrics.commits_week,
                    "commits in the last week",
                )?;
                summary.commits_last_month = add_count(
                    summary.commits_last_month,
                    metrics.commits_month,
                    "commits in the last month",
                )?;
                summary.total_contributors =
                    add_count(summary.total_contributors, metrics.contributors, "contributors")?;
            }

            for tool in ScanTool::ALL {
                if record.scans.get(tool) == ScanStatus::Enabled {
                    *summary.enabled_mut(tool) += 1;
                }
            }

            if record.scans.is_pending() {
                summary.pending_scans += 1;
            }
        }

        Ok(summary)
    }

    /// Number of repositories with `tool` enabled
    pub fn enabled(&self, tool: ScanTool) -> usize {
        match tool {
            ScanTool::Snyk => self.snyk_enabled,
            ScanTool::RevealLogic => self.rl_enabled,
            ScanTool::Semgrep => self.semgrep_enabled,
        }
    }

    fn enabled_mut(&mut self, tool: ScanTool) -> &mut usize {
        match tool {
            ScanTool::Snyk => &mut self.snyk_enabled,
            ScanTool::RevealLogic => &mut self.rl_enabled,
            ScanTool::Semgrep => &mut self.semgrep_enabled,
        }
    }
}

fn add_count(total: u64, value: u64, what: &str) -> Result<u64> {
    total
        .checked_add(value)
        .ok_or_else(|| MetricsError::CountOverflow(what.to_string()))
}
