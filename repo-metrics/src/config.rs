//! Report rendering configuration
//!
//! This module defines the small set of switches that change how a report is
//! rendered. Where the data comes from (snapshot files, tracked lists,
//! organization lookup) is handled by the application layer.

use serde::{Deserialize, Serialize};

/// Default hosting service used for repository hyperlinks
pub const DEFAULT_HOSTING_URL: &str = "https://github.com";

/// Configuration for report rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Render repository names as links to the repository page
    #[serde(default = "default_true")]
    pub link_repositories: bool,

    /// Render contributor counts as links to the contributors graph
    #[serde(default = "default_true")]
    pub link_contributors: bool,

    /// Emit the "Total contributors across all repositories" summary line
    #[serde(default = "default_true")]
    pub include_contributor_total: bool,

    /// Base URL of the hosting service (default: https://github.com)
    #[serde(default = "default_hosting_url")]
    pub hosting_url: String,
}

fn default_true() -> bool {
    true
}

fn default_hosting_url() -> String {
    DEFAULT_HOSTING_URL.to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            link_repositories: true,
            link_contributors: true,
            include_contributor_total: true,
            hosting_url: default_hosting_url(),
        }
    }
}

impl ReportConfig {
    /// Create a new report configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable repository links
    pub fn with_repository_links(mut self, enabled: bool) -> Self {
        self.link_repositories = enabled;
        self
    }

    /// Builder method: enable or disable contributor links
    pub fn with_contributor_links(mut self, enabled: bool) -> Self {
        self.link_contributors = enabled;
        self
    }

    /// Builder method: disable every hyperlink at once
    pub fn without_links(self) -> Self {
        self.with_repository_links(false).with_contributor_links(false)
    }

    /// Builder method: include or omit the contributor total
    pub fn with_contributor_total(mut self, enabled: bool) -> Self {
        self.include_contributor_total = enabled;
        self
    }

    /// Builder method: set the hosting base URL
    pub fn with_hosting_url(mut self, url: impl Into<String>) -> Self {
        self.hosting_url = url.into();
        self
    }

    /// Hosting URL without a trailing slash
    pub fn hosting_base(&self) -> &str {
        self.hosting_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_config_builder() {
        let config = ReportConfig::new()
            .with_repository_links(false)
            .with_contributor_total(false)
            .with_hosting_url("https://git.example.com/");

        assert!(!config.link_repositories);
        assert!(config.link_contributors);
        assert!(!config.include_contributor_total);
        assert_eq!(config.hosting_base(), "https://git.example.com");
    }

    #[test]
    fn test_without_links() {
        let config = ReportConfig::new().without_links();
        assert!(!config.link_repositories);
        assert!(!config.link_contributors);
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: ReportConfig = toml::from_str("").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.hosting_url, DEFAULT_HOSTING_URL);
    }
}
