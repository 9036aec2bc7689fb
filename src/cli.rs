//! Command handler functions for the lintrend CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout. External tools and the output
//! directory are passed in, so tests can substitute both.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::compare;
use crate::fix;
use crate::model::LintResults;
use crate::report::{ChartData, HtmlFormatter, JsonFormatter, TextFormatter};
use crate::runner::{FormatSource, LintSource, RuleFixer};
use crate::store::{History, Store, HTML_FILE, TREND_FILE};
use crate::theme::{Theme, THEMES};
use crate::track::{self, TrackOptions};

const SUMMARY_TOP_N: usize = 5;

/// Message for a history with nothing to show, or `None` if there are
/// snapshots.
fn no_data_message(store: &Store, history: &History) -> Option<String> {
    let path = store.log_path();
    match history {
        History::Missing => Some(format!(
            "No progress log found at {}.\nRun `lintrend track` first to create it.\n",
            path.display()
        )),
        History::Empty => Some(format!(
            "The progress log at {} is empty.\nRun `lintrend track` to record a run.\n",
            path.display()
        )),
        History::Unparsed => Some(format!(
            "No data entries found in {}.\nEntries look like:\n===== DATE =====\nX problems (Y errors, Z warnings)\n",
            path.display()
        )),
        History::Snapshots(_) => None,
    }
}

/// The latest run's detail, or `None` (with a warning) if it can't be read.
fn load_current(store: &Store) -> Option<LintResults> {
    match store.read_current() {
        Ok(current) => current,
        Err(e) => {
            tracing::warn!("could not load detailed results from {}: {e}", store.current_path().display());
            None
        }
    }
}

pub fn cmd_track(
    lint: &dyn LintSource,
    format: Option<&dyn FormatSource>,
    store: &Store,
    options: &TrackOptions,
    theme: &Theme,
    timestamp: &str,
) -> Result<String> {
    let outcome = track::track(lint, format, store, options, timestamp)
        .context("Failed to record lint run")?;
    let results = &outcome.results;
    let stats = &results.stats;

    let mut out = String::new();
    writeln!(out, "{}", theme.title.paint("=== LINT RUN RECORDED ===")).unwrap();
    write!(
        out,
        "Total issues: {} ({} errors, {} warnings",
        results.total(),
        theme.error.paint(&stats.errors.to_string()),
        theme.warning.paint(&stats.warnings.to_string())
    )
    .unwrap();
    if let Some(formatting) = stats.formatting {
        write!(out, ", {} formatting", theme.info.paint(&formatting.to_string())).unwrap();
    }
    out.push_str(")\n");
    writeln!(out, "Files scanned: {}", stats.total_files).unwrap();
    writeln!(out, "Files with issues: {}", stats.files_with_issues).unwrap();

    for problem in &outcome.recovered {
        writeln!(out, "{} {problem}", theme.warning.paint("Recorded as zero issues:")).unwrap();
    }

    if !results.worst_files.is_empty() {
        writeln!(out, "\n{}", theme.title.paint("Files with most issues:")).unwrap();
        for file in results.worst_files.iter().take(SUMMARY_TOP_N) {
            writeln!(out, "  {:<50} {:>5} ({} errors, {} warnings)", file.file, file.total, file.errors, file.warnings).unwrap();
        }
    }
    if !results.issues_by_directory.is_empty() {
        writeln!(out, "\n{}", theme.title.paint("Directories with most issues:")).unwrap();
        for dir in results.issues_by_directory.iter().take(SUMMARY_TOP_N) {
            let name = if dir.directory.is_empty() { "." } else { &dir.directory };
            writeln!(out, "  {:<50} {:>5}", name, dir.total).unwrap();
        }
    }
    if !results.rule_stats.is_empty() {
        writeln!(out, "\n{}", theme.title.paint("Most common rules:")).unwrap();
        for rule in results.rule_stats.iter().take(SUMMARY_TOP_N) {
            writeln!(out, "  {:<50} {:>5}", rule.rule, rule.count).unwrap();
        }
    }

    writeln!(out, "\nProgress logged to {}", store.log_path().display()).unwrap();
    writeln!(out, "Detailed results saved to {}", store.current_path().display()).unwrap();
    Ok(out)
}

pub fn cmd_chart(store: &Store, theme: &Theme, json: bool, today: NaiveDate) -> Result<String> {
    let history = store.read_log().context("Failed to read progress log")?;
    if let Some(message) = no_data_message(store, &history) {
        return Ok(message);
    }

    let current = load_current(store);
    let data = ChartData::new(history.snapshots(), current.as_ref(), today);

    if json {
        let export = data.format(&JsonFormatter);
        store
            .write_report(TREND_FILE, &export)
            .context("Failed to write trend export")?;
        return Ok(export);
    }
    Ok(data.format(&TextFormatter { theme: *theme }))
}

pub fn cmd_compare(store: &Store, theme: &Theme) -> Result<String> {
    let history = store.read_log().context("Failed to read progress log")?;
    if let Some(message) = no_data_message(store, &history) {
        return Ok(message);
    }

    let current = load_current(store);
    let previous = match store.read_previous() {
        Ok(previous) => previous,
        Err(e) => {
            tracing::warn!("could not load previous results: {e}");
            None
        }
    };

    match compare::compare(history.snapshots(), current.as_ref(), previous.as_ref()) {
        Some(comparison) => Ok(compare::render(&comparison, theme)),
        None => Ok(format!(
            "{}\nRun more lint analyses to generate comparison data.\n",
            theme.warning.paint("Need at least two scans to compare.")
        )),
    }
}

pub fn cmd_fix(
    source: &dyn LintSource,
    fixer: &dyn RuleFixer,
    rule: &str,
    dry_run: bool,
    theme: &Theme,
) -> Result<String> {
    let outcome = fix::fix_rule(source, fixer, rule, dry_run)?;
    let before = &outcome.before;

    let mut out = String::new();
    writeln!(out, "{}", theme.title.paint("=== FIX SUMMARY ===")).unwrap();
    writeln!(out, "Rule: {}", theme.error.paint(&before.rule)).unwrap();
    writeln!(out, "Occurrences: {}", theme.warning.paint(&before.count().to_string())).unwrap();
    writeln!(out, "Affected files: {}", theme.warning.paint(&before.files.len().to_string())).unwrap();

    if before.count() == 0 {
        writeln!(out, "{}", theme.success.paint("Nothing to fix for this rule.")).unwrap();
        return Ok(out);
    }

    let Some(after) = &outcome.after else {
        for file in &before.files {
            writeln!(out, "  {} {file}", theme.info.paint("→")).unwrap();
        }
        writeln!(out, "{}", theme.dim.paint("Dry run: no files were changed.")).unwrap();
        return Ok(out);
    };

    let fixed = outcome.fixed();
    if fixed > 0 {
        writeln!(out, "\n{}", theme.success.paint(&format!("Fixed {fixed} issues."))).unwrap();
    } else {
        writeln!(out, "\n{}", theme.warning.paint("No issues could be fixed automatically.")).unwrap();
    }

    if after.count() > 0 {
        writeln!(
            out,
            "{}",
            theme.warning.paint(&format!("{} issues require manual attention.", after.count()))
        )
        .unwrap();
        writeln!(out, "\n{}", theme.title.paint("=== REMAINING ISSUES ===")).unwrap();
        for occ in &after.occurrences {
            writeln!(out, "{}:{}", occ.file, occ.line).unwrap();
            writeln!(out, "  {}", theme.option.paint(&occ.message)).unwrap();
        }
    }
    Ok(out)
}

/// List themes, or select and preview one.
pub fn cmd_theme(store: &Store, name: Option<&str>, active: &Theme) -> Result<String> {
    let mut out = String::new();
    match name {
        Some(name) => {
            let theme = Theme::by_name(name)?;
            store.write_theme(theme.id).context("Failed to save theme")?;
            writeln!(out, "Theme set to {}.\n", theme.name).unwrap();
            out.push_str(&theme.preview());
        }
        None => {
            writeln!(out, "Available themes:").unwrap();
            for theme in &THEMES {
                let marker = if theme.id == active.id { "*" } else { " " };
                writeln!(out, "{marker} {:<12} {} - {}", theme.id, theme.name, theme.description).unwrap();
            }
        }
    }
    Ok(out)
}

pub fn cmd_html(store: &Store, generated_at: &str, today: NaiveDate) -> Result<String> {
    let history = store.read_log().context("Failed to read progress log")?;
    if let Some(message) = no_data_message(store, &history) {
        return Ok(message);
    }

    let current = load_current(store);
    let html = ChartData::new(history.snapshots(), current.as_ref(), today).format(&HtmlFormatter {
        generated_at: generated_at.to_string(),
    });
    let path = store
        .write_report(HTML_FILE, &html)
        .context("Failed to write HTML report")?;
    Ok(format!("HTML report written to {}\n", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LintrendError;
    use crate::model::{FileResult, IssueMessage, Severity};

    struct FixedLint(Vec<FileResult>);

    impl LintSource for FixedLint {
        fn lint(&self) -> crate::error::Result<Vec<FileResult>> {
            Ok(self.0.clone())
        }
    }

    impl RuleFixer for FixedLint {
        fn fix_rule(&self, _rule: &str) -> crate::error::Result<()> {
            Ok(())
        }
    }

    fn sample() -> Vec<FileResult> {
        vec![FileResult {
            file_path: "src/app.js".to_string(),
            messages: vec![IssueMessage {
                rule_id: Some("eqeqeq".to_string()),
                severity: Severity::Error,
                line: 4,
                message: "Expected '===' and instead saw '=='.".to_string(),
            }],
        }]
    }

    fn options() -> TrackOptions {
        TrackOptions {
            include_details: true,
            top_issues: 5,
            patterns: vec!["src".to_string()],
            root: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    #[test]
    fn test_cmd_track_summary() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        let out = cmd_track(&FixedLint(sample()), None, &store, &options(), &Theme::plain(), "2024-01-08")
            .unwrap();

        assert!(out.contains("Total issues: 1 (1 errors, 0 warnings)"));
        assert!(out.contains("Files scanned: 1"));
        assert!(out.contains("src/app.js"));
        assert!(out.contains("eqeqeq"));
        assert!(out.contains("Progress logged to"));
    }

    #[test]
    fn test_cmd_chart_without_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let out = cmd_chart(&store, &Theme::plain(), false, today()).unwrap();
        assert!(out.contains("No progress log found"));
        assert!(out.contains("lintrend track"));
    }

    #[test]
    fn test_cmd_chart_json_writes_export() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        store
            .append_entry("===== 2024-01-01 =====\n4 problems (4 errors, 0 warnings)\n")
            .unwrap();

        let out = cmd_chart(&store, &Theme::plain(), true, today()).unwrap();
        assert!(out.contains("\"current_only\""));
        assert_eq!(std::fs::read_to_string(store.trend_path()).unwrap(), out);
    }

    #[test]
    fn test_cmd_compare_needs_two_scans() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        store
            .append_entry("===== 2024-01-01 =====\n4 problems (4 errors, 0 warnings)\n")
            .unwrap();
        let out = cmd_compare(&store, &Theme::plain()).unwrap();
        assert!(out.contains("Need at least two scans to compare."));
    }

    #[test]
    fn test_cmd_fix_dry_run() {
        let lint = FixedLint(sample());
        let out = cmd_fix(&lint, &lint, "eqeqeq", true, &Theme::plain()).unwrap();
        assert!(out.contains("Occurrences: 1"));
        assert!(out.contains("→ src/app.js"));
        assert!(out.contains("Dry run"));
    }

    #[test]
    fn test_cmd_fix_reports_remaining() {
        let lint = FixedLint(sample());
        let out = cmd_fix(&lint, &lint, "eqeqeq", false, &Theme::plain()).unwrap();
        assert!(out.contains("No issues could be fixed automatically."));
        assert!(out.contains("src/app.js:4"));
    }

    #[test]
    fn test_cmd_fix_unknown_rule() {
        let lint = FixedLint(sample());
        let err = cmd_fix(&lint, &lint, "unknown", false, &Theme::plain()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LintrendError>(),
            Some(LintrendError::UnknownRule(_))
        ));
    }

    #[test]
    fn test_cmd_theme_select_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        let out = cmd_theme(&store, Some("sunset"), &Theme::default()).unwrap();
        assert!(out.contains("Theme set to Sunset."));
        assert_eq!(store.read_theme().unwrap().as_deref(), Some("sunset"));

        let listing = cmd_theme(&store, None, &Theme::by_name("sunset").unwrap()).unwrap();
        assert!(listing.contains("* sunset"));
        assert!(listing.contains("  ocean"));

        assert!(cmd_theme(&store, Some("neon"), &Theme::default()).is_err());
    }

    #[test]
    fn test_cmd_html_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        cmd_track(&FixedLint(sample()), None, &store, &options(), &Theme::plain(), "2024-01-08").unwrap();

        let out = cmd_html(&store, "2024-01-08T00:00:00Z", today()).unwrap();
        assert!(out.contains("lint-report.html"));
        let html = std::fs::read_to_string(store.html_path()).unwrap();
        assert!(html.contains("src/app.js"));
        assert!(html.contains("Expected") || html.contains("eqeqeq"));
    }
}
