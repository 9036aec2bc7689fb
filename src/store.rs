//! On-disk state: the append-only progress log plus the current/previous
//! JSON pair, all kept in one output directory.
//!
//! Every read goes to disk; nothing is cached between calls. There is no file
//! locking, so two processes writing the same directory at once may race.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::logfile;
use crate::model::{LintResults, Snapshot};

pub const LOG_FILE: &str = "lint.log";
pub const CURRENT_FILE: &str = "lint-results.json";
pub const PREVIOUS_FILE: &str = "previous.json";
pub const HTML_FILE: &str = "lint-report.html";
pub const TREND_FILE: &str = "trend.json";
pub const THEME_FILE: &str = "theme";

/// What the progress log currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum History {
    /// The log file does not exist yet.
    Missing,
    /// The file exists but is empty or whitespace only.
    Empty,
    /// The file has content but no line matched the log grammar.
    Unparsed,
    Snapshots(Vec<Snapshot>),
}

impl History {
    /// The parsed snapshots, empty for every state but `Snapshots`.
    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        match self {
            History::Snapshots(snaps) => snaps,
            _ => &[],
        }
    }
}

/// Handle to an output directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }

    #[must_use]
    pub fn current_path(&self) -> PathBuf {
        self.dir.join(CURRENT_FILE)
    }

    #[must_use]
    pub fn previous_path(&self) -> PathBuf {
        self.dir.join(PREVIOUS_FILE)
    }

    #[must_use]
    pub fn html_path(&self) -> PathBuf {
        self.dir.join(HTML_FILE)
    }

    #[must_use]
    pub fn trend_path(&self) -> PathBuf {
        self.dir.join(TREND_FILE)
    }

    #[must_use]
    pub fn theme_path(&self) -> PathBuf {
        self.dir.join(THEME_FILE)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Append a pre-formatted entry to the log. Existing content is never
    /// rewritten.
    pub fn append_entry(&self, entry: &str) -> Result<()> {
        self.ensure_dir()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())?;
        file.write_all(entry.as_bytes())?;
        tracing::debug!(path = %self.log_path().display(), bytes = entry.len(), "appended log entry");
        Ok(())
    }

    /// Read and parse the whole log.
    pub fn read_log(&self) -> Result<History> {
        let content = match fs::read_to_string(self.log_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(History::Missing),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(History::Empty);
        }
        let snapshots: Vec<Snapshot> = logfile::parse_log(&content).collect();
        tracing::debug!(count = snapshots.len(), "parsed progress log");
        if snapshots.is_empty() {
            Ok(History::Unparsed)
        } else {
            Ok(History::Snapshots(snapshots))
        }
    }

    /// Write a run's results to the current slot, moving any existing
    /// current file to the previous slot.
    ///
    /// The new content is written to a temporary file first, so a failed
    /// write leaves both slots untouched and a crash part way through never
    /// loses the prior snapshot.
    pub fn write_current(&self, results: &LintResults) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(results)?;

        let tmp = self.dir.join(format!("{CURRENT_FILE}.tmp"));
        fs::write(&tmp, json)?;

        let current = self.current_path();
        if current.exists() {
            fs::rename(&current, self.previous_path())?;
        }
        fs::rename(&tmp, &current)?;
        Ok(())
    }

    pub fn read_current(&self) -> Result<Option<LintResults>> {
        read_json(&self.current_path())
    }

    pub fn read_previous(&self) -> Result<Option<LintResults>> {
        read_json(&self.previous_path())
    }

    /// Name of the persisted theme, if one was ever selected.
    pub fn read_theme(&self) -> Result<Option<String>> {
        match fs::read_to_string(self.theme_path()) {
            Ok(name) => {
                let name = name.trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_theme(&self, name: &str) -> Result<()> {
        self.ensure_dir()?;
        fs::write(self.theme_path(), format!("{name}\n"))?;
        Ok(())
    }

    /// Write a rendered report into the output directory, returning its path.
    pub fn write_report(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(file_name);
        fs::write(&path, contents)?;
        tracing::info!(path = %path.display(), "wrote report");
        Ok(path)
    }
}

fn read_json(path: &Path) -> Result<Option<LintResults>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
