//! Roll up one lint run's findings into per-rule, per-file and per-directory
//! counts plus a scalar summary.

use std::collections::HashMap;
use std::path::Path;

use crate::model::{
    DirectoryStat, FileResult, FileStat, LintResults, RuleStat, RunStats, Severity,
};

/// Insertion-ordered accumulator keyed by string.
///
/// Sorting happens once at the end with a stable sort, so entries with equal
/// counts keep the order in which they were first seen.
struct Tally<T> {
    index: HashMap<String, usize>,
    items: Vec<T>,
}

impl<T> Tally<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str, make: impl FnOnce() -> T) -> &mut T {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.items.push(make());
                self.index.insert(key.to_string(), self.items.len() - 1);
                self.items.len() - 1
            }
        };
        &mut self.items[idx]
    }

    fn into_sorted_desc(self, key: impl Fn(&T) -> u64) -> Vec<T> {
        let mut items = self.items;
        items.sort_by(|a, b| key(b).cmp(&key(a)));
        items
    }
}

/// Aggregate the results of one lint run.
///
/// * `root`: when given, file paths under it are reported relative to it.
/// * `timestamp`: recorded verbatim as the run's date.
/// * `formatting`: the independently sourced count of files needing
///   reformatting, or `None` when the formatting check was disabled.
///
/// Files without counted findings are omitted from the file and directory
/// breakdowns but still count towards `totalFiles`.
pub fn aggregate(
    files: &[FileResult],
    root: Option<&Path>,
    timestamp: &str,
    formatting: Option<u64>,
) -> LintResults {
    let mut stats = RunStats {
        formatting,
        ..RunStats::default()
    };
    let mut rules: Tally<RuleStat> = Tally::new();
    let mut file_stats: Tally<FileStat> = Tally::new();
    let mut dirs: Tally<DirectoryStat> = Tally::new();

    for file in files {
        stats.total_files += 1;

        let mut errors = 0;
        let mut warnings = 0;
        for msg in &file.messages {
            let rule_key = msg.rule_key();
            let make_rule = || RuleStat {
                rule: rule_key.to_string(),
                count: 0,
                errors: 0,
                warnings: 0,
            };
            match msg.severity {
                Severity::Error => {
                    errors += 1;
                    let rule = rules.entry(rule_key, make_rule);
                    rule.count += 1;
                    rule.errors += 1;
                }
                Severity::Warning => {
                    warnings += 1;
                    let rule = rules.entry(rule_key, make_rule);
                    rule.count += 1;
                    rule.warnings += 1;
                }
                Severity::Off => {}
            }
        }

        if errors + warnings == 0 {
            continue;
        }

        stats.errors += errors;
        stats.warnings += warnings;

        let path = display_path(&file.file_path, root);
        let directory = directory_of(&path);

        let file_stat = file_stats.entry(&path, || FileStat {
            file: path.clone(),
            total: 0,
            errors: 0,
            warnings: 0,
        });
        if file_stat.total == 0 {
            stats.files_with_issues += 1;
        }
        file_stat.errors += errors;
        file_stat.warnings += warnings;
        file_stat.total += errors + warnings;

        let dir_stat = dirs.entry(&directory, || DirectoryStat {
            directory: directory.clone(),
            errors: 0,
            warnings: 0,
            total: 0,
        });
        dir_stat.errors += errors;
        dir_stat.warnings += warnings;
        dir_stat.total += errors + warnings;
    }

    tracing::debug!(
        files = stats.total_files,
        with_issues = stats.files_with_issues,
        errors = stats.errors,
        warnings = stats.warnings,
        "aggregated lint run"
    );

    LintResults {
        timestamp: timestamp.to_string(),
        stats,
        worst_files: file_stats.into_sorted_desc(|f| f.total),
        issues_by_directory: dirs.into_sorted_desc(|d| d.total),
        rule_stats: rules.into_sorted_desc(|r| r.count),
    }
}

/// The path as it should appear in reports: relative to `root` when the
/// file lives under it, unchanged otherwise.
fn display_path(file_path: &str, root: Option<&Path>) -> String {
    let path = Path::new(file_path);
    let relative = root
        .and_then(|root| path.strip_prefix(root).ok())
        .unwrap_or(path);
    relative.to_string_lossy().into_owned()
}

/// Parent directory of a report path. Files at the top level map to `""`.
#[must_use]
pub fn directory_of(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueMessage, UNKNOWN_RULE};

    fn msg(rule: Option<&str>, severity: u8) -> IssueMessage {
        IssueMessage {
            rule_id: rule.map(str::to_string),
            severity: Severity::from(severity),
            line: 1,
            message: String::new(),
        }
    }

    fn file(path: &str, messages: Vec<IssueMessage>) -> FileResult {
        FileResult {
            file_path: path.to_string(),
            messages,
        }
    }

    fn sample() -> Vec<FileResult> {
        vec![
            file(
                "src/a/b.ts",
                vec![msg(Some("semi"), 2), msg(Some("semi"), 2), msg(Some("quotes"), 1)],
            ),
            file("src/clean.ts", vec![]),
            file("index.ts", vec![msg(None, 2), msg(Some("quotes"), 1)]),
            file("src/a/c.ts", vec![msg(Some("eqeqeq"), 1)]),
        ]
    }

    #[test]
    fn test_aggregate_counts() {
        let results = aggregate(&sample(), None, "2024-01-01", None);

        assert_eq!(results.stats.total_files, 4);
        assert_eq!(results.stats.files_with_issues, 3);
        assert_eq!(results.stats.errors, 3);
        assert_eq!(results.stats.warnings, 3);
        assert_eq!(results.stats.formatting, None);
        assert_eq!(results.total(), 6);

        let snapshot = results.snapshot();
        assert_eq!(snapshot.total, 6);
        assert_eq!(snapshot.date, "2024-01-01");
    }

    #[test]
    fn test_sparse_file_stats() {
        let results = aggregate(&sample(), None, "t", None);
        let files: Vec<_> = results.worst_files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(files, vec!["src/a/b.ts", "index.ts", "src/a/c.ts"]);
        assert_eq!(results.worst_files[0].total, 3);
        assert_eq!(results.worst_files[0].errors, 2);
        assert_eq!(results.worst_files[0].warnings, 1);
    }

    #[test]
    fn test_directory_rollup() {
        let results = aggregate(&sample(), None, "t", None);
        assert_eq!(results.issues_by_directory.len(), 2);
        assert_eq!(results.issues_by_directory[0].directory, "src/a");
        assert_eq!(results.issues_by_directory[0].total, 4);
        assert_eq!(results.issues_by_directory[1].directory, "");
        assert_eq!(results.issues_by_directory[1].total, 2);
    }

    #[test]
    fn test_directory_of() {
        assert_eq!(directory_of("src/a/b.ts"), "src/a");
        assert_eq!(directory_of("b.ts"), "");
        assert_eq!(directory_of(""), "");
    }

    #[test]
    fn test_unknown_rule_grouped_and_counted() {
        let results = aggregate(&sample(), None, "t", None);
        let unknown = results
            .rule_stats
            .iter()
            .find(|r| r.rule == UNKNOWN_RULE)
            .unwrap();
        assert_eq!(unknown.count, 1);
        assert_eq!(unknown.errors, 1);
        assert_eq!(results.top_rule().unwrap().rule, "semi");
    }

    #[test]
    fn test_rule_sort_is_stable() {
        // quotes and semi both have 2; semi appears first in the input.
        let results = aggregate(&sample(), None, "t", None);
        let rules: Vec<_> = results.rule_stats.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(rules, vec!["semi", "quotes", "unknown", "eqeqeq"]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let input = sample();
        let a = aggregate(&input, None, "t", Some(2));
        let b = aggregate(&input, None, "t", Some(2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_formatting_is_independent_tally() {
        let results = aggregate(&sample(), None, "t", Some(4));
        assert_eq!(results.stats.formatting, Some(4));
        assert_eq!(results.stats.errors + results.stats.warnings, 6);
        assert_eq!(results.total(), 10);
        assert_eq!(results.snapshot().formatting, 4);
    }

    #[test]
    fn test_root_relative_paths() {
        let input = vec![file("/repo/src/x.ts", vec![msg(Some("semi"), 2)])];
        let results = aggregate(&input, Some(Path::new("/repo")), "t", None);
        assert_eq!(results.worst_files[0].file, "src/x.ts");
        assert_eq!(results.issues_by_directory[0].directory, "src");
    }

    #[test]
    fn test_severity_off_is_ignored() {
        let input = vec![file("a.ts", vec![msg(Some("semi"), 0)])];
        let results = aggregate(&input, None, "t", None);
        assert_eq!(results.stats.files_with_issues, 0);
        assert!(results.worst_files.is_empty());
        assert!(results.rule_stats.is_empty());
    }
}
