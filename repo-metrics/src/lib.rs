//! Repository Metrics Library
//!
//! A stateless library for turning already-collected repository metrics into
//! the Markdown "Repository Metrics Report", and for checking existing reports.
//!
//! # Architecture
//!
//! - Loads metrics snapshots (JSON or TOML) into report records
//! - Aggregates the summary and security scan counts
//! - Renders the report as a GitHub-flavoured Markdown document
//! - Parses rendered reports back and verifies their summaries
//!
//! The library does NOT:
//! - Talk to a git hosting service or a security scanner
//! - Read environment variables or application config files
//! - Decide which repositories are tracked
//!
//! Those concerns belong to the application layer (repo-metrics-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use repo_metrics::{load_snapshot, MetricsReport, ReportConfig};
//! use std::path::Path;
//!
//! let records = load_snapshot(Path::new("metrics.json"))
//!     .unwrap()
//!     .into_records(Some("acme"))
//!     .unwrap();
//!
//! let generated_on = chrono::Local::now().naive_local();
//! let report = MetricsReport::new(generated_on, records);
//! let config = ReportConfig::new().with_contributor_total(true);
//! report
//!     .write_to(Path::new("metrics_report.md"), &config)
//!     .unwrap();
//! ```

// Public modules
pub mod config;
pub mod parser;
pub mod report;
pub mod snapshot;
pub mod summary;
pub mod table;
pub mod types;
pub mod verify;

// Re-export main types for convenience
pub use config::ReportConfig;
pub use parser::{parse_report, ParsedReport, ParsedSection};
pub use report::MetricsReport;
pub use snapshot::{load_snapshot, Snapshot, SnapshotEntry};
pub use summary::ReportSummary;
pub use types::{
    format_timestamp, parse_timestamp, LastCommit, MetricsError, MetricsOutcome, RepositoryMetrics,
    RepositoryRecord, Result, ScanStatus, ScanStatuses, ScanTool, Timestamp,
};
pub use verify::{check_records, verify_report, Finding, Severity};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
