//! Repository Metrics CLI Application
//!
//! This is the command-line interface for the repository metrics report.
//! It uses the repo-metrics library and adds:
//! - Application config (repo-metrics.toml)
//! - Tracked repository list and organization lookup
//! - Logging setup
//! - `render` and `verify` commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::{AppConfig, OrganizationSources, DEFAULT_REPOS_FILE};
use report::RenderOptions;

/// Repository Metrics - Render and verify repository metrics reports
#[derive(Parser, Debug)]
#[command(name = "repo-metrics")]
#[command(about = "Render and verify Markdown repository metrics reports", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (default: repo-metrics.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a report from a metrics snapshot
    Render {
        /// Metrics snapshot (.json or .toml)
        #[arg(short, long, value_name = "FILE")]
        snapshot: Option<PathBuf>,

        /// Tracked repository list (YAML with a `repos` key)
        #[arg(long, value_name = "FILE")]
        repos: Option<PathBuf>,

        /// Organization used as the default repository owner
        #[arg(long)]
        org: Option<String>,

        /// Output file for the report
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Timestamp to stamp the report with (YYYY-MM-DD HH:MM:SS, default: now)
        #[arg(long, value_name = "TIMESTAMP")]
        generated_on: Option<String>,

        /// Render repository names and contributor counts as plain text
        #[arg(long)]
        no_links: bool,
    },
    /// Check that a report's summary sections agree with its table
    Verify {
        /// Report to check
        #[arg(value_name = "FILE")]
        report: PathBuf,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Repository Metrics CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using repo-metrics library v{}", repo_metrics::VERSION);

    let app_config = config::load_config_or_default(args.config.as_deref())?;

    match args.command {
        Command::Render {
            snapshot,
            repos,
            org,
            output,
            generated_on,
            no_links,
        } => {
            let options = render_options(
                app_config,
                snapshot,
                repos,
                org,
                output,
                generated_on,
                no_links,
            )?;
            let report = report::render(&options)?;
            if !args.quiet {
                println!(
                    "Report generated: {} ({} repositories)",
                    options.output.display(),
                    report.records.len()
                );
            }
        }
        Command::Verify { report } => {
            let findings = report::verify(&report)?;
            if !args.quiet {
                for finding in &findings {
                    println!("{}", finding);
                }
                println!("{}", report::verify_status(&report, &findings));
            }
        }
    }

    Ok(())
}

/// Merge command line flags over the config file
fn render_options(
    app_config: AppConfig,
    snapshot: Option<PathBuf>,
    repos: Option<PathBuf>,
    org: Option<String>,
    output: Option<PathBuf>,
    generated_on: Option<String>,
    no_links: bool,
) -> Result<RenderOptions> {
    let AppConfig {
        input,
        output: output_config,
        report: mut report_config,
    } = app_config;

    let snapshot = snapshot.or(input.snapshot).context(
        "No metrics snapshot given. Use --snapshot or set [input] snapshot in the config file",
    )?;

    let repos_path = repos.or(input.repos).or_else(|| {
        let default = Path::new(DEFAULT_REPOS_FILE);
        default.exists().then(|| default.to_path_buf())
    });
    let repos = repos_path
        .map(|path| {
            log::info!("Loading tracked repositories from {:?}", path);
            config::load_repo_list(&path)
        })
        .transpose()?;

    let organization = OrganizationSources::from_env(org, input.organization).resolve()?;
    if let Some(org) = &organization {
        log::info!("Collecting metrics for organization: {}", org);
    }

    let generated_on = match generated_on {
        Some(value) => repo_metrics::parse_timestamp(&value)?,
        None => chrono::Local::now().naive_local(),
    };

    if no_links {
        report_config = report_config.without_links();
    }

    Ok(RenderOptions {
        snapshot,
        repos,
        organization,
        output: output.unwrap_or(output_config.path),
        generated_on,
        report: report_config,
    })
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
