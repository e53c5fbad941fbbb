//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.contestrank.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".contestrank.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Scoring service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "leaderboard.md".to_string()
}

/// Scoring service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the scoring service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Handles sent per batch request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_base_url() -> String {
    "https://leetcode-server-seven.vercel.app".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_batch_size() -> usize {
    crate::fetch::DEFAULT_BATCH_SIZE
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the smoothed overlay curve in JSON reports.
    #[serde(default = "default_true")]
    pub include_curve: bool,

    /// Width in characters of the longest histogram bar.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_curve: true,
            bar_width: default_bar_width(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bar_width() -> usize {
    40
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.service_url {
            self.service.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.service.timeout_seconds = timeout;
        }
        if let Some(batch_size) = args.batch_size {
            self.service.batch_size = batch_size;
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if args.no_curve {
            self.report.include_curve = false;
        }
    }

    /// Check values that would make a run impossible.
    pub fn validate(&self) -> Result<()> {
        if self.service.batch_size == 0 {
            anyhow::bail!("Batch size must be at least 1");
        }
        if self.service.timeout_seconds == 0 {
            anyhow::bail!("Timeout must be at least 1 second");
        }
        let url = &self.service.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Service URL must start with 'http://' or 'https://'");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
