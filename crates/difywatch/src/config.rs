//! Configuration for the difywatch run
//!
//! Everything the run needs is collected into one `Config` constructed at
//! process start and passed by reference into each component; no module
//! holds global mutable state. Every knob is a CLI flag with an
//! environment-variable fallback so the cron entry stays a one-liner.

use std::path::PathBuf;

use clap::Parser;

/// Default remote of the community plugin repository.
pub const DEFAULT_COMMUNITY_REMOTE: &str = "https://github.com/langgenius/dify-plugins.git";
/// Default remote of the official plugin repository.
pub const DEFAULT_OFFICIAL_REMOTE: &str =
    "https://github.com/langgenius/dify-official-plugins.git";

/// difywatch - count Dify plugins and report 24h changes to a chat webhook
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "difywatch")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory holding the local repository snapshots
    ///
    /// Defaults to <data dir>/difywatch/repos.
    #[arg(long, env = "DIFYWATCH_REPOS_DIR")]
    pub repos_dir: Option<PathBuf>,

    /// Directory holding the persisted count history
    ///
    /// Defaults to <data dir>/difywatch/data.
    #[arg(long, env = "DIFYWATCH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Remote URL of the community plugin repository
    #[arg(long, env = "DIFYWATCH_COMMUNITY_REMOTE", default_value = DEFAULT_COMMUNITY_REMOTE)]
    pub community_remote: String,

    /// Remote URL of the official plugin repository
    #[arg(long, env = "DIFYWATCH_OFFICIAL_REMOTE", default_value = DEFAULT_OFFICIAL_REMOTE)]
    pub official_remote: String,

    /// Chat webhook URL the report is posted to
    ///
    /// When unset, the report is logged instead of delivered.
    #[arg(long, env = "DIFYWATCH_WEBHOOK")]
    pub webhook: Option<String>,

    /// Lookback window for change classification, in hours
    #[arg(long, env = "DIFYWATCH_LOOKBACK_HOURS", default_value_t = 24)]
    pub lookback_hours: u64,

    /// Overall wall-clock budget for the run, in minutes
    #[arg(long, env = "DIFYWATCH_BUDGET_MINS", default_value_t = 15)]
    pub budget_mins: u64,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    fn base_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("difywatch")
    }

    /// Directory the repository snapshots live under.
    #[must_use]
    pub fn repos_dir(&self) -> PathBuf {
        self.repos_dir
            .clone()
            .unwrap_or_else(|| Self::base_dir().join("repos"))
    }

    /// Directory the history file lives under.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| Self::base_dir().join("data"))
    }

    /// Local snapshot path of the community repository.
    #[must_use]
    pub fn community_path(&self) -> PathBuf {
        self.repos_dir().join("dify-plugins")
    }

    /// Local snapshot path of the official repository.
    #[must_use]
    pub fn official_path(&self) -> PathBuf {
        self.repos_dir().join("dify-official-plugins")
    }

    /// Path of the persisted count history.
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.data_dir().join("plugin_history.json")
    }

    /// Lookback window in seconds.
    #[must_use]
    pub fn lookback_secs(&self) -> i64 {
        self.lookback_hours as i64 * 3600
    }

    /// Create the snapshot and data directories if missing.
    ///
    /// # Errors
    ///
    /// Returns an error when either directory cannot be created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dir in [self.repos_dir(), self.data_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|e| ConfigError::DirectoryCreateFailed(dir.clone(), e))?;
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to create a working directory
    #[error("Failed to create directory {0}: {1}")]
    DirectoryCreateFailed(PathBuf, std::io::Error),
}
