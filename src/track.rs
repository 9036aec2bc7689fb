//! One recording run: lint, optionally count formatting issues, aggregate,
//! append to the progress log and rotate the JSON snapshot.

use std::path::PathBuf;

use crate::aggregate::aggregate;
use crate::error::{LintrendError, Result};
use crate::fix;
use crate::logfile::{self, EntryDetails};
use crate::model::LintResults;
use crate::runner::{FormatSource, LintSource};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct TrackOptions {
    pub include_details: bool,
    pub top_issues: usize,
    /// Patterns echoed in the formatter suggestion.
    pub patterns: Vec<String>,
    /// Report file paths relative to this directory when under it.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TrackOutcome {
    pub results: LintResults,
    /// The text appended to the log.
    pub entry: String,
    /// Tool failures that were recovered from by recording zero issues.
    pub recovered: Vec<String>,
}

/// Record one run.
///
/// Unparseable or failed tool output is treated as zero issues for that
/// category. A missing tool or a timeout aborts the run before anything is
/// written.
pub fn track(
    lint: &dyn LintSource,
    format: Option<&dyn FormatSource>,
    store: &Store,
    options: &TrackOptions,
    timestamp: &str,
) -> Result<TrackOutcome> {
    let mut recovered = Vec::new();

    let files = recover(lint.lint(), "ESLint", &mut recovered)?;
    let formatting = match format {
        Some(source) => Some(recover(
            source.unformatted_count(),
            "Prettier",
            &mut recovered,
        )?),
        None => None,
    };

    let results = aggregate(&files, options.root.as_deref(), timestamp, formatting);

    let suggestion = results
        .top_rule()
        .and_then(|rule| fix::suggestion(rule, &options.patterns));
    let details = EntryDetails {
        rules: &results.rule_stats,
        limit: options.top_issues,
        suggestion,
    };
    let entry = logfile::format_entry(
        &results.snapshot(),
        formatting.is_some(),
        options.include_details.then_some(&details),
    );

    store.append_entry(&entry)?;
    store.write_current(&results)?;
    tracing::info!(total = results.total(), "recorded lint run");

    Ok(TrackOutcome {
        results,
        entry,
        recovered,
    })
}

/// Downgrade output problems to an empty result, keeping fatal errors.
fn recover<T: Default>(result: Result<T>, tool: &str, recovered: &mut Vec<String>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e @ (LintrendError::UnparseableOutput { .. } | LintrendError::ToolFailed { .. })) => {
            tracing::warn!("{tool} produced no usable results, recording zero issues: {e}");
            recovered.push(format!("{tool}: {e}"));
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}
