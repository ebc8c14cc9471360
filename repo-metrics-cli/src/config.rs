//! Configuration loading: application config, tracked repositories, organization

use anyhow::{Context, Result};
use repo_metrics::ReportConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default application config file, used when present
pub const DEFAULT_CONFIG_FILE: &str = "repo-metrics.toml";
/// Default tracked repository list, used when present
pub const DEFAULT_REPOS_FILE: &str = "config/repos.yaml";
/// Organization fallback file
pub const ORGANIZATION_FILE: &str = "config/organization.yaml";
/// Default report location
pub const DEFAULT_OUTPUT_FILE: &str = "metrics_report.md";

/// Main application configuration (loaded from repo-metrics.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Metrics snapshot (.json or .toml)
    pub snapshot: Option<PathBuf>,
    /// Tracked repository list (YAML)
    pub repos: Option<PathBuf>,
    /// Default owner for repositories that do not name one
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Load the explicit config file, or the default one if it exists
pub fn load_config_or_default(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            log::debug!("Using default config file {}", DEFAULT_CONFIG_FILE);
            load_config(Path::new(DEFAULT_CONFIG_FILE))
        }
        None => Ok(AppConfig::default()),
    }
}

#[derive(Debug, Deserialize)]
struct RepoList {
    #[serde(default)]
    repos: Vec<String>,
}

/// Load the tracked repository list (`repos: [name, ...]`)
pub fn load_repo_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read repository list: {:?}", path))?;

    let list: RepoList = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse repository list: {:?}", path))?;

    Ok(list.repos)
}

#[derive(Debug, Deserialize)]
struct OrganizationFile {
    #[serde(default)]
    organization: Option<String>,
}

/// Where the organization lookup may find a value, in priority order
#[derive(Debug, Clone, Default)]
pub struct OrganizationSources {
    pub flag: Option<String>,
    pub config: Option<String>,
    /// Value of `GITHUB_REPOSITORY` (`owner/repo`)
    pub github_repository: Option<String>,
    pub organization_file: Option<PathBuf>,
    /// Value of `GITHUB_ORG`
    pub github_org: Option<String>,
}

impl OrganizationSources {
    /// Collect sources from the process environment
    pub fn from_env(flag: Option<String>, config: Option<String>) -> Self {
        Self {
            flag,
            config,
            github_repository: std::env::var("GITHUB_REPOSITORY").ok(),
            organization_file: Some(PathBuf::from(ORGANIZATION_FILE)),
            github_org: std::env::var("GITHUB_ORG").ok(),
        }
    }

    /// Resolve the organization, or `None` if no source provides one
    pub fn resolve(&self) -> Result<Option<String>> {
        if let Some(org) = non_empty(self.flag.as_deref()) {
            log::debug!("Organization from command line: {}", org);
            return Ok(Some(org));
        }

        if let Some(org) = non_empty(self.config.as_deref()) {
            log::debug!("Organization from config file: {}", org);
            return Ok(Some(org));
        }

        if let Some((owner, _)) = self
            .github_repository
            .as_deref()
            .and_then(|repo| repo.split_once('/'))
        {
            if let Some(org) = non_empty(Some(owner)) {
                log::info!("Detected organization name from GITHUB_REPOSITORY: {}", org);
                return Ok(Some(org));
            }
        }

        if let Some(path) = self.organization_file.as_deref().filter(|p| p.exists()) {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read organization file: {:?}", path))?;
            let file: OrganizationFile = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse organization file: {:?}", path))?;
            if let Some(org) = non_empty(file.organization.as_deref()) {
                log::info!("Read organization name from {:?}: {}", path, org);
                return Ok(Some(org));
            }
        }

        if let Some(org) = non_empty(self.github_org.as_deref()) {
            log::debug!("Organization from GITHUB_ORG: {}", org);
            return Ok(Some(org));
        }

        log::warn!("Could not determine organization name from arguments, config or environment");
        Ok(None)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
