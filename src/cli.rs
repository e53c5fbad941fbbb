//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ContestRank - contest leaderboards from a roster and a scoring service
///
/// Reads a roster of participants, fetches their scores in batches, and
/// writes a ranked leaderboard with summary statistics and a score
/// distribution. Markdown/JSON reports.
///
/// Examples:
///   contestrank --roster participants.json
///   contestrank --roster participants.json --format json --output board.json
///   contestrank --roster participants.json --dry-run
///   contestrank --user some_handle
///   contestrank --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Roster file: JSON array of rows with "name" and "username" columns
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present_any = ["init_config", "user"]
    )]
    pub roster: Option<PathBuf>,

    /// Look up a single handle instead of building a leaderboard
    #[arg(short, long, value_name = "HANDLE", conflicts_with = "roster")]
    pub user: Option<String>,

    /// Scoring service base URL
    ///
    /// Can also be set via CONTESTRANK_SERVICE_URL or .contestrank.toml.
    #[arg(long, value_name = "URL", env = "CONTESTRANK_SERVICE_URL")]
    pub service_url: Option<String>,

    /// Handles per scoring request (default: from config or 50)
    #[arg(long, value_name = "COUNT")]
    pub batch_size: Option<usize>,

    /// Per-request timeout in seconds (default: from config or 60)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output file path for the report (default: from config or leaderboard.md)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .contestrank.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Leave the smoothed distribution curve out of JSON reports
    #[arg(long)]
    pub no_curve: bool,

    /// Exit with code 2 if any scoring batch failed
    #[arg(long)]
    pub strict: bool,

    /// Validate the roster and print the batch plan without calling the service
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .contestrank.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.batch_size == Some(0) {
            return Err("Batch size must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(ref url) = self.service_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Service URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref user) = self.user {
            if user.trim().is_empty() {
                return Err("Handle must not be empty".to_string());
            }
        }

        if let Some(ref roster) = self.roster {
            if !roster.is_file() {
                return Err(format!("Roster file does not exist: {}", roster.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
