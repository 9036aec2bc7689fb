use std::path::Path;

use lintrend::error::Result;
use lintrend::model::FileResult;
use lintrend::runner::{FormatSource, LintSource};
use lintrend::store::Store;
use tempfile::TempDir;

/// Create a store in a fresh temporary directory.
/// The caller must hold onto `TempDir` to keep the directory alive.
pub fn setup_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(dir.path().join("reports"));
    (store, dir)
}

/// Seed the store's log with the contents of a fixture.
pub fn seed_log(store: &Store, fixture: &Path) {
    let content = std::fs::read_to_string(fixture).unwrap();
    store.append_entry(&content).unwrap();
}

/// Lint source that replays canned ESLint JSON.
pub struct CannedLint(pub String);

impl LintSource for CannedLint {
    fn lint(&self) -> Result<Vec<FileResult>> {
        lintrend::parsers::eslint::parse(self.0.as_bytes())
    }
}

pub struct CannedFormat(pub u64);

impl FormatSource for CannedFormat {
    fn unformatted_count(&self) -> Result<u64> {
        Ok(self.0)
    }
}
