//! Report generation and verification commands

use anyhow::{bail, Context, Result};
use repo_metrics::{
    check_records, load_snapshot, parse_report, verify_report, Finding, MetricsReport,
    RepositoryRecord, ReportConfig, ScanStatuses, Severity, Timestamp,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reason recorded for tracked repositories the snapshot does not cover
pub const MISSING_FROM_SNAPSHOT: &str = "no metrics collected";

/// Everything `render` needs once flags and config are merged
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub snapshot: PathBuf,
    pub repos: Option<Vec<String>>,
    pub organization: Option<String>,
    pub output: PathBuf,
    pub generated_on: Timestamp,
    pub report: ReportConfig,
}

/// Build the report from the snapshot and write it out
pub fn render(options: &RenderOptions) -> Result<MetricsReport> {
    let snapshot = load_snapshot(&options.snapshot)
        .with_context(|| format!("Failed to load snapshot: {:?}", options.snapshot))?;
    // Tracked repositories missing from the snapshot take the same default owner
    let default_owner = snapshot
        .organization
        .clone()
        .or_else(|| options.organization.clone());
    let records = snapshot.into_records(options.organization.as_deref())?;

    if records.is_empty() {
        bail!("No repositories found in snapshot {:?}", options.snapshot);
    }

    // Checked before tracking selection, which keeps one record per name
    let findings = check_records(&records);
    for finding in &findings {
        log_finding(finding);
    }
    let errors = findings.iter().filter(|f| f.is_error()).count();
    if errors > 0 {
        bail!("{} check(s) failed for snapshot {:?}", errors, options.snapshot);
    }

    let records = match &options.repos {
        Some(tracked) => {
            if tracked.is_empty() {
                bail!("No repositories found in the tracked repository list");
            }
            select_tracked(records, tracked, default_owner.as_deref())?
        }
        None => records,
    };

    log::info!("Found {} repositories to report on", records.len());

    let report = MetricsReport::new(options.generated_on, records);
    report
        .write_to(&options.output, &options.report)
        .with_context(|| format!("Failed to write report: {:?}", options.output))?;

    Ok(report)
}

/// Keep tracked repositories in list order.
///
/// Tracked names missing from the snapshot become failed rows; snapshot
/// entries that are not tracked are dropped.
pub fn select_tracked(
    records: Vec<RepositoryRecord>,
    tracked: &[String],
    organization: Option<&str>,
) -> Result<Vec<RepositoryRecord>> {
    let mut by_name: HashMap<String, RepositoryRecord> = HashMap::new();
    for record in records {
        if let Some(kept) = by_name.get(&record.name) {
            log::warn!(
                "Dropping {}/{}: repository name already taken by {}/{}",
                record.owner,
                record.name,
                kept.owner,
                kept.name
            );
            continue;
        }
        by_name.insert(record.name.clone(), record);
    }

    let mut selected = Vec::with_capacity(tracked.len());
    for name in tracked {
        match by_name.remove(name) {
            Some(record) => selected.push(record),
            None => {
                log::warn!("Repository {} has no entry in the snapshot", name);
                let Some(owner) = organization else {
                    bail!(
                        "Repository {} is missing from the snapshot and no organization is known",
                        name
                    );
                };
                selected.push(RepositoryRecord::failed(
                    name.as_str(),
                    owner,
                    ScanStatuses::default(),
                    MISSING_FROM_SNAPSHOT,
                ));
            }
        }
    }

    let mut untracked: Vec<&String> = by_name.keys().collect();
    untracked.sort();
    for name in untracked {
        log::warn!("Skipping {}: not in the tracked repository list", name);
    }

    Ok(selected)
}

/// Parse and verify an existing report; fails if any check reports an error
pub fn verify(path: &Path) -> Result<Vec<Finding>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {:?}", path))?;
    let parsed =
        parse_report(&content).with_context(|| format!("Failed to parse report: {:?}", path))?;

    log::info!(
        "Verifying report generated on {} ({} repositories)",
        repo_metrics::format_timestamp(&parsed.generated_on),
        parsed.rows.len()
    );

    let findings = verify_report(&parsed);
    for finding in &findings {
        log_finding(finding);
    }

    let errors = findings.iter().filter(|f| f.is_error()).count();
    if errors > 0 {
        bail!("{} check(s) failed for {:?}", errors, path);
    }

    Ok(findings)
}

/// Final line printed by `verify`
pub fn verify_status(path: &Path, findings: &[Finding]) -> String {
    match findings.len() {
        0 => format!("{}: OK", path.display()),
        1 => format!("{}: OK (1 warning)", path.display()),
        n => format!("{}: OK ({} warnings)", path.display(), n),
    }
}

fn log_finding(finding: &Finding) {
    match finding.severity {
        Severity::Error => log::error!("{}", finding.message),
        Severity::Warning => log::warn!("{}", finding.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_metrics::{parse_timestamp, MetricsOutcome, RepositoryMetrics};
    use std::io::Write;

    fn collected(name: &str) -> RepositoryRecord {
        RepositoryRecord::collected(
            name,
            "acme",
            ScanStatuses::default(),
            RepositoryMetrics::default(),
        )
    }

    #[test]
    fn test_select_tracked_order_and_missing() {
        let records = vec![collected("a"), collected("b"), collected("untracked")];
        let tracked = vec!["b".to_string(), "missing".to_string(), "a".to_string()];

        let selected = select_tracked(records, &tracked, Some("acme")).unwrap();
        let names: Vec<&str> = selected.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "missing", "a"]);
        assert_eq!(
            selected[1].outcome,
            MetricsOutcome::Failed {
                reason: MISSING_FROM_SNAPSHOT.to_string()
            }
        );
    }

    #[test]
    fn test_select_tracked_needs_owner_for_missing() {
        let result = select_tracked(vec![collected("a")], &["ghost".to_string()], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_tracked_keeps_first_of_same_name() {
        let mut other = collected("a");
        other.owner = "elsewhere".to_string();
        let selected =
            select_tracked(vec![collected("a"), other], &["a".to_string()], None).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].owner, "acme");
    }

    #[test]
    fn test_render_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("metrics.json");
        std::fs::write(
            &snapshot,
            r#"{"repositories": [
                {"name": "centralrepo", "owner": "acme"},
                {"name": "centralrepo", "owner": "elsewhere"}
            ]}"#,
        )
        .unwrap();

        let options = RenderOptions {
            snapshot,
            repos: Some(vec!["centralrepo".to_string()]),
            organization: None,
            output: dir.path().join("metrics_report.md"),
            generated_on: parse_timestamp("2025-03-15 08:00:00").unwrap(),
            report: ReportConfig::default(),
        };

        let err = render(&options).unwrap_err();
        assert!(err.to_string().contains("1 check(s) failed"));
        assert!(!options.output.exists());
    }

    #[test]
    fn test_verify_status_counts_warnings() {
        let path = Path::new("report.md");
        assert_eq!(verify_status(path, &[]), "report.md: OK");
        assert_eq!(
            verify_status(path, &[Finding::warning("late")]),
            "report.md: OK (1 warning)"
        );
        assert_eq!(
            verify_status(path, &[Finding::warning("a"), Finding::warning("b")]),
            "report.md: OK (2 warnings)"
        );
    }

    #[test]
    fn test_render_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("metrics.json");
        let mut file = std::fs::File::create(&snapshot).unwrap();
        file.write_all(
            br#"{"organization": "acme", "repositories": [
                {"name": "centralrepo", "commits_week": 1, "commits_month": 4, "contributors": 2,
                 "scans": {"snyk": "Enabled"}}
            ]}"#,
        )
        .unwrap();

        let options = RenderOptions {
            snapshot,
            repos: Some(vec!["centralrepo".to_string(), "monitoringrepo01".to_string()]),
            organization: None,
            output: dir.path().join("out/metrics_report.md"),
            generated_on: parse_timestamp("2025-03-15 08:00:00").unwrap(),
            report: ReportConfig::default(),
        };

        let report = render(&options).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].owner, "acme");
        assert!(verify(&options.output).unwrap().is_empty());

        let text = std::fs::read_to_string(&options.output).unwrap();
        assert!(text.contains("Repositories with Snyk enabled: 1/2"));
        assert!(text.contains("Error: no metrics collected"));
    }

    #[test]
    fn test_verify_fails_on_inconsistent_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        std::fs::write(
            &path,
            "# Repository Metrics Report\n\nGenerated on: 2025-03-15 08:00:00\n\n\
             | Repository | Commits (Week) | Commits (Month) | Snyk | RL | Semgrep |\n\
             |---|---|---|---|---|---|\n\
             | a | 1 | 1 | Enabled | Disabled | Disabled |\n\n\
             ## Summary\n\nTotal repositories: 2\n\
             Repositories with commits in the last week: 1\n\
             Total commits in the last week: 1\nTotal commits in the last month: 1\n\n\
             ## Security Scan Status\n\n\
             Repositories with Snyk enabled: 1/1\nRepositories with RL enabled: 0/1\n\
             Repositories with Semgrep enabled: 0/1\n\
             Repositories pending scan implementation: 0/1\n",
        )
        .unwrap();

        let err = verify(&path).unwrap_err();
        assert!(err.to_string().contains("1 check(s) failed"));
    }
}
