//! Runtime configuration.
//!
//! Settings come from three places, highest priority first:
//! 1. Command-line flags
//! 2. A TOML file given with `--config`
//! 3. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use encore_foundation::{Error, Result};
use serde::Deserialize;
use tracing::info;

/// Settings for the REPL and batch runner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Primary REPL prompt.
    pub prompt: String,

    /// Whether to print the welcome banner.
    pub show_banner: bool,

    /// Where to keep REPL history between runs, if anywhere.
    pub history_file: Option<PathBuf>,

    /// Whether each command runs in its own transaction.
    ///
    /// When off, changes need an explicit `begin` ... `commit`.
    pub auto_commit: bool,

    /// Whether to start with a small demonstration archive.
    pub seed_demo: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_filter: "encore=info".to_string(),
            prompt: "encore> ".to_string(),
            show_banner: true,
            history_file: None,
            auto_commit: true,
            seed_demo: false,
        }
    }
}

/// Values given on the command line, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `log_filter`.
    pub log_filter: Option<String>,
    /// Replaces `prompt`.
    pub prompt: Option<String>,
    /// Forces the banner off.
    pub no_banner: bool,
    /// Replaces `history_file`.
    pub history_file: Option<PathBuf>,
    /// Forces `auto_commit` off.
    pub manual_commit: bool,
    /// Forces `seed_demo` on.
    pub seed_demo: bool,
}

impl RuntimeConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for malformed TOML or unknown keys.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::config(format!("failed to parse TOML: {e}")))
    }

    /// Loads a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&source)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(filter) = overrides.log_filter {
            self.log_filter = filter;
        }
        if let Some(prompt) = overrides.prompt {
            self.prompt = prompt;
        }
        if overrides.no_banner {
            self.show_banner = false;
        }
        if let Some(history) = overrides.history_file {
            self.history_file = Some(history);
        }
        if overrides.manual_commit {
            self.auto_commit = false;
        }
        if overrides.seed_demo {
            self.seed_demo = true;
        }
        self
    }
}
