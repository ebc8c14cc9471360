//! Snapshot file loader
//!
//! A snapshot is the already-collected metrics for a set of repositories,
//! stored as JSON or TOML. Loading converts it into report records.

use crate::types::{
    LastCommit, MetricsError, RepositoryMetrics, RepositoryRecord, Result, ScanStatuses,
    Timestamp,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level snapshot document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Snapshot {
    /// Default owner for entries that do not name one
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub repositories: Vec<SnapshotEntry>,
}

/// One repository in a snapshot
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SnapshotEntry {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub last_commit: Option<SnapshotCommit>,
    #[serde(default)]
    pub open_issues: u64,
    #[serde(default)]
    pub last_release: Option<String>,
    #[serde(default)]
    pub commits_week: u64,
    #[serde(default)]
    pub commits_month: u64,
    #[serde(default)]
    pub contributors: u64,
    #[serde(default)]
    pub scans: ScanStatuses,
    /// Set when collection failed for this repository
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotCommit {
    #[serde(with = "timestamp_format")]
    pub timestamp: Timestamp,
    pub author: String,
}

mod timestamp_format {
    use crate::types::{format_timestamp, parse_timestamp, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Load a snapshot file, choosing the parser from the file extension
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    log::info!("Loading snapshot: {:?}", path);

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    let content = std::fs::read_to_string(path)?;

    let snapshot = match extension.as_deref() {
        Some("json") => parse_json(&content)?,
        Some("toml") => parse_toml(&content)?,
        _ => {
            return Err(MetricsError::UnsupportedFormat(format!(
                "{:?} (expected .json or .toml)",
                path
            )))
        }
    };

    log::info!(
        "Loaded {} repositories from {:?}",
        snapshot.repositories.len(),
        path
    );
    Ok(snapshot)
}

/// Parse a JSON snapshot document
pub fn parse_json(content: &str) -> Result<Snapshot> {
    serde_json::from_str(content).map_err(|e| MetricsError::SnapshotParseError(e.to_string()))
}

/// Parse a TOML snapshot document
pub fn parse_toml(content: &str) -> Result<Snapshot> {
    toml::from_str(content).map_err(|e| MetricsError::SnapshotParseError(e.to_string()))
}

impl Snapshot {
    /// Convert into report records.
    ///
    /// Owners resolve as: entry owner, then the snapshot organization, then
    /// `default_owner`.
    pub fn into_records(self, default_owner: Option<&str>) -> Result<Vec<RepositoryRecord>> {
        let organization = self.organization;
        self.repositories
            .into_iter()
            .map(|entry| {
                let owner = entry
                    .owner
                    .clone()
                    .or_else(|| organization.clone())
                    .or_else(|| default_owner.map(str::to_string))
                    .ok_or_else(|| MetricsError::MissingOwner(entry.name.clone()))?;
                Ok(entry.into_record(owner))
            })
            .collect()
    }
}

impl SnapshotEntry {
    fn into_record(self, owner: String) -> RepositoryRecord {
        if let Some(reason) = self.error {
            log::debug!("Snapshot marks {} as failed: {}", self.name, reason);
            return RepositoryRecord::failed(self.name, owner, self.scans, reason);
        }

        let metrics = RepositoryMetrics {
            last_commit: self.last_commit.map(|c| LastCommit {
                timestamp: c.timestamp,
                author: c.author,
            }),
            open_issues: self.open_issues,
            last_release: self.last_release,
            commits_week: self.commits_week,
            commits_month: self.commits_month,
            contributors: self.contributors,
        };
        RepositoryRecord::collected(self.name, owner, self.scans, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MetricsOutcome, ScanStatus};
    use std::io::Write;
    use tempfile::Builder;

    const JSON_SNAPSHOT: &str = r#"{
        "organization": "acme",
        "repositories": [
            {
                "name": "monitoringrepo02",
                "last_commit": {"timestamp": "2025-03-14 09:26:53", "author": "Ada"},
                "open_issues": 2,
                "last_release": "v1.4.0",
                "commits_week": 3,
                "commits_month": 3,
                "contributors": 4,
                "scans": {"snyk": "Enabled", "rl": "Disabled", "semgrep": "Pending Implementation"}
            },
            {
                "name": "centralrepo",
                "owner": "platform",
                "error": "404 Not Found"
            }
        ]
    }"#;

    #[test]
    fn test_parse_json_snapshot() {
        let records = parse_json(JSON_SNAPSHOT)
            .unwrap()
            .into_records(None)
            .unwrap();

        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first.owner, "acme");
        assert_eq!(first.scans.snyk, ScanStatus::Enabled);
        let metrics = first.metrics().unwrap();
        assert_eq!(metrics.commits_week, 3);
        assert_eq!(metrics.last_release.as_deref(), Some("v1.4.0"));
        assert_eq!(metrics.last_commit.as_ref().unwrap().author, "Ada");

        let second = &records[1];
        assert_eq!(second.owner, "platform");
        assert_eq!(
            second.outcome,
            MetricsOutcome::Failed {
                reason: "404 Not Found".to_string()
            }
        );
    }

    #[test]
    fn test_parse_toml_snapshot() {
        let content = r#"
            [[repositories]]
            name = "monitoringrepo01"
            owner = "acme"
            commits_week = 1
            commits_month = 5

            [repositories.scans]
            semgrep = "Enabled"
        "#;

        let records = parse_toml(content).unwrap().into_records(None).unwrap();
        assert_eq!(records.len(), 1);
        let metrics = records[0].metrics().unwrap();
        assert!(metrics.last_commit.is_none());
        assert!(metrics.last_release.is_none());
        assert_eq!(metrics.commits_month, 5);
        assert_eq!(records[0].scans.semgrep, ScanStatus::Enabled);
        assert_eq!(records[0].scans.snyk, ScanStatus::PendingImplementation);
    }

    #[test]
    fn test_default_owner_fallback() {
        let snapshot = parse_json(r#"{"repositories": [{"name": "solo"}]}"#).unwrap();
        assert!(matches!(
            snapshot.clone().into_records(None),
            Err(MetricsError::MissingOwner(name)) if name == "solo"
        ));

        let records = snapshot.into_records(Some("fallback-org")).unwrap();
        assert_eq!(records[0].owner, "fallback-org");
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let content = r#"{"repositories": [{"name": "r", "last_commit": {"timestamp": "yesterday", "author": "x"}}]}"#;
        assert!(matches!(
            parse_json(content),
            Err(MetricsError::SnapshotParseError(_))
        ));
    }

    #[test]
    fn test_load_snapshot_by_extension() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(JSON_SNAPSHOT.as_bytes()).unwrap();
        file.flush().unwrap();

        let snapshot = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.organization.as_deref(), Some("acme"));

        let mut other = Builder::new().suffix(".csv").tempfile().unwrap();
        other.write_all(b"name\n").unwrap();
        assert!(matches!(
            load_snapshot(other.path()),
            Err(MetricsError::UnsupportedFormat(_))
        ));
    }
}
