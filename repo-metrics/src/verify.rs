//! Consistency checks for records and rendered reports
//!
//! Report checks compare the summary sections against the table they
//! summarise. Record checks run before rendering.

use crate::parser::{ParsedReport, ParsedSection};
use crate::report::{
    scan_enabled_label, COL_COMMITS_MONTH, COL_COMMITS_WEEK, COL_CONTRIBUTORS, COL_REPOSITORY,
    LABEL_ACTIVE_LAST_WEEK, LABEL_COMMITS_MONTH, LABEL_COMMITS_WEEK, LABEL_PENDING_SCANS,
    LABEL_TOTAL_CONTRIBUTORS, LABEL_TOTAL_REPOSITORIES, SCAN_STATUS_HEADING, SUMMARY_HEADING,
};
use crate::types::{RepositoryRecord, ScanStatus, ScanTool};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single problem found by a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Check records before rendering
pub fn check_records(records: &[RepositoryRecord]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen = HashSet::new();

    for record in records {
        if !seen.insert(record.name.as_str()) {
            findings.push(Finding::error(format!(
                "duplicate repository name '{}' ({}/{})",
                record.name, record.owner, record.name
            )));
        }

        if let Some(metrics) = record.metrics() {
            if metrics.commits_week > metrics.commits_month {
                findings.push(Finding::warning(format!(
                    "{}: commits in the last week ({}) exceed commits in the last month ({})",
                    record.name, metrics.commits_week, metrics.commits_month
                )));
            }
        }
    }

    findings
}

/// Check that a report's summary sections agree with its table
pub fn verify_report(report: &ParsedReport) -> Vec<Finding> {
    let mut findings = Vec::new();
    let total = report.rows.len();

    let summary_pos = report.section_position(SUMMARY_HEADING);
    let scan_pos = report.section_position(SCAN_STATUS_HEADING);
    match (summary_pos, scan_pos) {
        (None, _) => findings.push(Finding::error(format!("missing section '{}'", SUMMARY_HEADING))),
        (_, None) => findings.push(Finding::error(format!(
            "missing section '{}'",
            SCAN_STATUS_HEADING
        ))),
        (Some(summary), Some(scan)) if summary > scan => findings.push(Finding::error(format!(
            "section '{}' must come before '{}'",
            SUMMARY_HEADING, SCAN_STATUS_HEADING
        ))),
        _ => {}
    }

    for header in [COL_REPOSITORY, COL_COMMITS_WEEK, COL_COMMITS_MONTH] {
        if report.column(header).is_none() {
            findings.push(Finding::error(format!("missing table column '{}'", header)));
        }
    }

    let week = numeric_column(report, COL_COMMITS_WEEK);
    let month = numeric_column(report, COL_COMMITS_MONTH);

    for (index, (w, m)) in week.iter().zip(month.iter()).enumerate() {
        if let (Some(w), Some(m)) = (w, m) {
            if w > m {
                findings.push(Finding::warning(format!(
                    "{}: commits in the last week ({}) exceed commits in the last month ({})",
                    row_name(report, index),
                    w,
                    m
                )));
            }
        }
    }

    if let Some(summary) = report.section(SUMMARY_HEADING) {
        let active = week.iter().filter(|w| matches!(w, Some(n) if *n > 0)).count() as u64;
        let checks = [
            (LABEL_TOTAL_REPOSITORIES, Some(total as u64)),
            (LABEL_ACTIVE_LAST_WEEK, Some(active)),
            (LABEL_COMMITS_WEEK, checked_total(&week)),
            (LABEL_COMMITS_MONTH, checked_total(&month)),
        ];
        for (label, actual) in checks {
            match summary.value(label) {
                Some(value) => check_count(&mut findings, label, value, actual),
                None => findings.push(Finding::error(format!("missing line '{}'", label))),
            }
        }

        // The contributor total is optional
        if let Some(value) = summary.value(LABEL_TOTAL_CONTRIBUTORS) {
            let contributors = numeric_column(report, COL_CONTRIBUTORS);
            check_count(
                &mut findings,
                LABEL_TOTAL_CONTRIBUTORS,
                value,
                checked_total(&contributors),
            );
        }
    }

    if let Some(scans) = report.section(SCAN_STATUS_HEADING) {
        let statuses: Vec<Option<Vec<&str>>> = ScanTool::ALL
            .iter()
            .map(|tool| report.column_values(tool.label()))
            .collect();

        for (tool, values) in ScanTool::ALL.iter().zip(&statuses) {
            let Some(values) = values else {
                findings.push(Finding::error(format!(
                    "missing table column '{}'",
                    tool.label()
                )));
                continue;
            };
            let enabled = values
                .iter()
                .filter(|v| **v == ScanStatus::Enabled.as_str())
                .count();
            check_fraction(&mut findings, scans, &scan_enabled_label(*tool), enabled, total);
        }

        let pending = (0..total)
            .filter(|row| {
                statuses
                    .iter()
                    .flatten()
                    .any(|values| values[*row] == ScanStatus::PendingImplementation.as_str())
            })
            .count();
        check_fraction(&mut findings, scans, LABEL_PENDING_SCANS, pending, total);
    }

    findings
}

/// `actual` is `None` when the table total overflows a u64
fn check_count(findings: &mut Vec<Finding>, label: &str, value: &str, actual: Option<u64>) {
    let Some(actual) = actual else {
        findings.push(Finding::error(format!(
            "'{}' total in the table overflows a 64-bit count",
            label
        )));
        return;
    };

    match value.parse::<u64>() {
        Ok(stated) if stated == actual => {}
        Ok(stated) => findings.push(Finding::error(format!(
            "'{}' states {} but the table gives {}",
            label, stated, actual
        ))),
        Err(_) => findings.push(Finding::error(format!(
            "'{}' has a non-numeric value '{}'",
            label, value
        ))),
    }
}

fn check_fraction(
    findings: &mut Vec<Finding>,
    section: &ParsedSection,
    label: &str,
    actual: usize,
    total: usize,
) {
    let Some(value) = section.value(label) else {
        findings.push(Finding::error(format!("missing line '{}'", label)));
        return;
    };

    match parse_fraction(value) {
        Some((count, of)) => {
            if count != actual {
                findings.push(Finding::error(format!(
                    "'{}' states {} but the table gives {}",
                    label, count, actual
                )));
            }
            if of != total {
                findings.push(Finding::error(format!(
                    "'{}' is out of {} but the table has {} repositories",
                    label, of, total
                )));
            }
        }
        None => findings.push(Finding::error(format!(
            "'{}' is not a fraction: '{}'",
            label, value
        ))),
    }
}

/// Numeric cells of a column; `None` for cells such as "Error"
fn numeric_column(report: &ParsedReport, header: &str) -> Vec<Option<u64>> {
    report
        .column_values(header)
        .map(|values| values.iter().map(|v| v.parse::<u64>().ok()).collect())
        .unwrap_or_else(|| vec![None; report.rows.len()])
}

fn checked_total(values: &[Option<u64>]) -> Option<u64> {
    values
        .iter()
        .flatten()
        .try_fold(0u64, |total, value| total.checked_add(*value))
}

fn row_name(report: &ParsedReport, index: usize) -> String {
    report
        .column(COL_REPOSITORY)
        .and_then(|col| report.rows[index].get(col))
        .cloned()
        .unwrap_or_else(|| format!("row {}", index + 1))
}

/// Parse "X/N"
fn parse_fraction(value: &str) -> Option<(usize, usize)> {
    let (count, of) = value.split_once('/')?;
    Some((count.trim().parse().ok()?, of.trim().parse().ok()?))
}
