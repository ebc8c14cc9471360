//! Core types for the repository metrics library
//!
//! This module defines the per-repository record that every report row is built
//! from, together with the scan enablement enums and the crate error type.
//! The types carry already-collected data only - nothing here talks to a
//! hosting service or a scanner.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type used throughout the library (report-local wall clock time)
pub type Timestamp = NaiveDateTime;

/// Format used for every timestamp written to or read from a report
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result type for library operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while loading, rendering or parsing reports
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to parse snapshot file: {0}")]
    SnapshotParseError(String),

    #[error("Unsupported snapshot format: {0}")]
    UnsupportedFormat(String),

    #[error("No owner known for repository: {0}")]
    MissingOwner(String),

    #[error("Failed to parse report: {0}")]
    ReportParseError(String),

    #[error("Invalid timestamp '{0}' (expected YYYY-MM-DD HH:MM:SS)")]
    InvalidTimestamp(String),

    #[error("Total of {0} does not fit in a 64-bit count")]
    CountOverflow(String),

    #[error("Invalid scan status: {0}")]
    InvalidScanStatus(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Parse a timestamp in the report format
pub fn parse_timestamp(value: &str) -> Result<Timestamp> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| MetricsError::InvalidTimestamp(value.trim().to_string()))
}

/// Format a timestamp in the report format
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Security scanning integrations tracked per repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanTool {
    Snyk,
    /// RevealLogic
    RevealLogic,
    Semgrep,
}

impl ScanTool {
    /// All tools in table column order
    pub const ALL: [ScanTool; 3] = [ScanTool::Snyk, ScanTool::RevealLogic, ScanTool::Semgrep];

    /// Label used for the table column and the summary line
    pub fn label(&self) -> &'static str {
        match self {
            ScanTool::Snyk => "Snyk",
            ScanTool::RevealLogic => "RL",
            ScanTool::Semgrep => "Semgrep",
        }
    }
}

impl fmt::Display for ScanTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Enablement status of one scan tool on one repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScanStatus {
    Enabled,
    Disabled,
    #[default]
    #[serde(rename = "Pending Implementation", alias = "pending")]
    PendingImplementation,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Enabled => "Enabled",
            ScanStatus::Disabled => "Disabled",
            ScanStatus::PendingImplementation => "Pending Implementation",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" => Ok(ScanStatus::Enabled),
            "disabled" => Ok(ScanStatus::Disabled),
            "pending implementation" | "pending" => Ok(ScanStatus::PendingImplementation),
            _ => Err(MetricsError::InvalidScanStatus(s.trim().to_string())),
        }
    }
}

/// Scan enablement for all tracked tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanStatuses {
    #[serde(default)]
    pub snyk: ScanStatus,
    #[serde(default)]
    pub rl: ScanStatus,
    #[serde(default)]
    pub semgrep: ScanStatus,
}

impl ScanStatuses {
    pub fn new(snyk: ScanStatus, rl: ScanStatus, semgrep: ScanStatus) -> Self {
        Self { snyk, rl, semgrep }
    }

    /// Status of a single tool
    pub fn get(&self, tool: ScanTool) -> ScanStatus {
        match tool {
            ScanTool::Snyk => self.snyk,
            ScanTool::RevealLogic => self.rl,
            ScanTool::Semgrep => self.semgrep,
        }
    }

    /// True if any tool is still pending implementation
    pub fn is_pending(&self) -> bool {
        ScanTool::ALL
            .iter()
            .any(|tool| self.get(*tool) == ScanStatus::PendingImplementation)
    }
}

/// Most recent commit on the default branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastCommit {
    pub timestamp: Timestamp,
    pub author: String,
}

impl fmt::Display for LastCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", format_timestamp(&self.timestamp), self.author)
    }
}

/// Metrics collected for one repository
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepositoryMetrics {
    /// `None` when the repository has no commits
    pub last_commit: Option<LastCommit>,
    pub open_issues: u64,
    /// Release label; `None` when nothing has been released
    pub last_release: Option<String>,
    pub commits_week: u64,
    pub commits_month: u64,
    pub contributors: u64,
}

/// Whether metrics could be collected for a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsOutcome {
    Collected(RepositoryMetrics),
    Failed { reason: String },
}

/// One row of the metrics report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    pub name: String,
    pub owner: String,
    pub scans: ScanStatuses,
    pub outcome: MetricsOutcome,
}

impl RepositoryRecord {
    /// Create a record with collected metrics
    pub fn collected(
        name: impl Into<String>,
        owner: impl Into<String>,
        scans: ScanStatuses,
        metrics: RepositoryMetrics,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            scans,
            outcome: MetricsOutcome::Collected(metrics),
        }
    }

    /// Create a record whose metrics could not be collected
    pub fn failed(
        name: impl Into<String>,
        owner: impl Into<String>,
        scans: ScanStatuses,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            scans,
            outcome: MetricsOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Collected metrics, if any
    pub fn metrics(&self) -> Option<&RepositoryMetrics> {
        match &self.outcome {
            MetricsOutcome::Collected(metrics) => Some(metrics),
            MetricsOutcome::Failed { .. } => None,
        }
    }

    /// `<hosting>/<owner>/<repo>`
    pub fn repository_url(&self, hosting_url: &str) -> String {
        format!(
            "{}/{}/{}",
            hosting_url.trim_end_matches('/'),
            self.owner,
            self.name
        )
    }

    /// `<hosting>/<owner>/<repo>/graphs/contributors`
    pub fn contributors_url(&self, hosting_url: &str) -> String {
        format!("{}/graphs/contributors", self.repository_url(hosting_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_status_parsing() {
        assert_eq!("Enabled".parse::<ScanStatus>().unwrap(), ScanStatus::Enabled);
        assert_eq!(" disabled ".parse::<ScanStatus>().unwrap(), ScanStatus::Disabled);
        assert_eq!(
            "Pending Implementation".parse::<ScanStatus>().unwrap(),
            ScanStatus::PendingImplementation
        );
        assert!("on".parse::<ScanStatus>().is_err());
    }

    #[test]
    fn test_scan_status_serde_literals() {
        let json = serde_json::to_string(&ScanStatus::PendingImplementation).unwrap();
        assert_eq!(json, "\"Pending Implementation\"");

        let statuses: ScanStatuses = serde_json::from_str(r#"{"snyk": "Enabled"}"#).unwrap();
        assert_eq!(statuses.snyk, ScanStatus::Enabled);
        assert_eq!(statuses.rl, ScanStatus::PendingImplementation);
        assert!(statuses.is_pending());
    }

    #[test]
    fn test_last_commit_display() {
        let commit = LastCommit {
            timestamp: parse_timestamp("2025-03-14 09:26:53").unwrap(),
            author: "Ada Lovelace".to_string(),
        };
        assert_eq!(commit.to_string(), "2025-03-14 09:26:53 by Ada Lovelace");
    }

    #[test]
    fn test_repository_urls() {
        let record = RepositoryRecord::failed("centralrepo", "acme", ScanStatuses::default(), "boom");
        assert_eq!(
            record.repository_url("https://github.com/"),
            "https://github.com/acme/centralrepo"
        );
        assert_eq!(
            record.contributors_url("https://github.com"),
            "https://github.com/acme/centralrepo/graphs/contributors"
        );
        assert!(record.metrics().is_none());
    }

    #[test]
    fn test_invalid_timestamp() {
        assert!(matches!(
            parse_timestamp("14/03/2025"),
            Err(MetricsError::InvalidTimestamp(_))
        ));
    }
}
