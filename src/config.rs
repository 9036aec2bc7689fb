//! Configuration loading and effective settings resolution.
//!
//! Settings come from an optional `lintrend.toml` in the working directory
//! (or the file named by `--config`) and from command-line flags.
//! Precedence: CLI > config file > defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{LintrendError, Result};
use crate::runner::{Eslint, Prettier};
use crate::store::Store;

pub const CONFIG_FILE: &str = "lintrend.toml";

pub const DEFAULT_PATTERN: &str = "src/**/*.{js,jsx,ts,tsx}";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_TOP_ISSUES: usize = 5;

/// Contents of `lintrend.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub patterns: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub check_formatting: Option<bool>,
    pub include_details: Option<bool>,
    pub top_issues: Option<usize>,
    pub lint_command: Option<Vec<String>>,
    pub format_command: Option<Vec<String>>,
    pub theme: Option<String>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub check_formatting: Option<bool>,
    pub include_details: Option<bool>,
}

/// Fully-resolved configuration used by commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Glob patterns handed to the linter and formatter.
    pub patterns: Vec<String>,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    /// When false, runs record no formatting count at all.
    pub check_formatting: bool,
    /// Write the top-rules block and a suggestion below each log entry.
    pub include_details: bool,
    pub top_issues: usize,
    pub lint_command: Vec<String>,
    pub format_command: Vec<String>,
    pub theme: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_PATTERN.to_string()],
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            check_formatting: true,
            include_details: true,
            top_issues: DEFAULT_TOP_ISSUES,
            lint_command: vec!["npx".to_string(), "eslint".to_string()],
            format_command: vec!["npx".to_string(), "prettier".to_string()],
            theme: None,
        }
    }
}

impl Config {
    /// Load the config file, if any, and apply CLI overrides.
    ///
    /// An explicitly named file must exist; the default `lintrend.toml` in
    /// `cwd` is optional.
    pub fn load(explicit: Option<&Path>, cwd: &Path, overrides: &Overrides) -> Result<Self> {
        let file = match explicit {
            Some(path) => load_file(path)?,
            None => {
                let path = cwd.join(CONFIG_FILE);
                if path.exists() {
                    load_file(&path)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Self::resolve(file, overrides)
    }

    /// Merge file settings and overrides over the defaults.
    pub fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Self> {
        let defaults = Config::default();

        let timeout_ms = overrides
            .timeout_ms
            .or(file.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(LintrendError::Config("timeout must be greater than zero".to_string()));
        }

        let config = Config {
            patterns: file.patterns.unwrap_or(defaults.patterns),
            output_dir: overrides
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or(defaults.output_dir),
            timeout: Duration::from_millis(timeout_ms),
            check_formatting: overrides
                .check_formatting
                .or(file.check_formatting)
                .unwrap_or(defaults.check_formatting),
            include_details: overrides
                .include_details
                .or(file.include_details)
                .unwrap_or(defaults.include_details),
            top_issues: file.top_issues.unwrap_or(defaults.top_issues),
            lint_command: file.lint_command.unwrap_or(defaults.lint_command),
            format_command: file.format_command.unwrap_or(defaults.format_command),
            theme: file.theme,
        };

        if config.patterns.is_empty() {
            return Err(LintrendError::Config("patterns must not be empty".to_string()));
        }
        if config.lint_command.is_empty() || config.format_command.is_empty() {
            return Err(LintrendError::Config("tool commands must not be empty".to_string()));
        }
        Ok(config)
    }

    #[must_use]
    pub fn store(&self) -> Store {
        Store::new(&self.output_dir)
    }

    #[must_use]
    pub fn eslint(&self) -> Eslint {
        Eslint {
            command: self.lint_command.clone(),
            patterns: self.patterns.clone(),
            timeout: self.timeout,
        }
    }

    #[must_use]
    pub fn prettier(&self) -> Prettier {
        Prettier {
            command: self.format_command.clone(),
            patterns: self.patterns.clone(),
            timeout: self.timeout,
        }
    }
}

/// Read and parse a TOML config file.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path).map_err(|e| {
        LintrendError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    let file: FileConfig = toml::from_str(&text)
        .map_err(|e| LintrendError::Config(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(file)
}
