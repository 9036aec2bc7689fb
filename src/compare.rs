//! Compare the two most recent recorded runs.

use std::fmt::Write;

use crate::model::{percent_of, signed_change, FileStat, LintResults, Snapshot};
use crate::theme::Theme;

const MAX_FILE_CHANGES: usize = 5;

/// Change in one category between two runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryChange {
    pub label: &'static str,
    pub previous: u64,
    pub current: u64,
}

impl CategoryChange {
    /// Positive when issues went down.
    #[must_use]
    pub fn diff(&self) -> i64 {
        signed_change(self.previous, self.current)
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        percent_of(self.diff(), self.previous)
    }

    /// e.g. `10 → 8 (↓ -2 (-20.0%))`.
    #[must_use]
    pub fn format(&self, theme: &Theme) -> String {
        let span = format!("{} → {}", self.previous, self.current);
        let diff = self.diff();
        let pct = self.percent().abs();
        match diff {
            d if d > 0 => format!(
                "{} ({})",
                theme.success.paint(&span),
                theme.success.paint(&format!("↓ -{d} (-{pct:.1}%)"))
            ),
            d if d < 0 => format!(
                "{} ({})",
                theme.error.paint(&span),
                theme.error.paint(&format!("↑ +{} (+{pct:.1}%)", d.unsigned_abs()))
            ),
            _ => format!(
                "{} ({})",
                theme.info.paint(&span),
                theme.info.paint("no change")
            ),
        }
    }
}

/// Per-file change between the previous and current JSON snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub file: String,
    pub previous_errors: u64,
    pub previous_warnings: u64,
    pub current_errors: u64,
    pub current_warnings: u64,
}

impl FileChange {
    /// Positive when the file improved.
    #[must_use]
    pub fn total_change(&self) -> i64 {
        signed_change(
            self.previous_errors.saturating_add(self.previous_warnings),
            self.current_errors.saturating_add(self.current_warnings),
        )
    }

    #[must_use]
    pub fn marker(&self) -> &'static str {
        match self.total_change() {
            c if c > 0 => "↓",
            c if c < 0 => "↑",
            _ => "=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub previous: Snapshot,
    pub current: Snapshot,
    pub categories: Vec<CategoryChange>,
    /// Present only when both JSON snapshots exist.
    pub files: Option<Vec<FileChange>>,
}

/// Compare the last two snapshots of a history. Returns `None` when there
/// are fewer than two.
#[must_use]
pub fn compare(
    history: &[Snapshot],
    current_json: Option<&LintResults>,
    previous_json: Option<&LintResults>,
) -> Option<Comparison> {
    let [.., previous, current] = history else {
        return None;
    };

    let mut categories = vec![
        CategoryChange {
            label: "Total issues",
            previous: previous.total,
            current: current.total,
        },
        CategoryChange {
            label: "Errors",
            previous: previous.errors,
            current: current.errors,
        },
        CategoryChange {
            label: "Warnings",
            previous: previous.warnings,
            current: current.warnings,
        },
    ];
    if previous.formatting > 0 || current.formatting > 0 {
        categories.push(CategoryChange {
            label: "Formatting",
            previous: previous.formatting,
            current: current.formatting,
        });
    }

    let files = match (current_json, previous_json) {
        (Some(cur), Some(prev)) => Some(file_changes(&prev.worst_files, &cur.worst_files)),
        _ => None,
    };

    Some(Comparison {
        previous: previous.clone(),
        current: current.clone(),
        categories,
        files,
    })
}

/// Files present in either run, largest absolute change first. Ties keep
/// previous-run order, then current-run order for new files.
fn file_changes(previous: &[FileStat], current: &[FileStat]) -> Vec<FileChange> {
    let mut changes: Vec<FileChange> = previous
        .iter()
        .map(|f| FileChange {
            file: f.file.clone(),
            previous_errors: f.errors,
            previous_warnings: f.warnings,
            current_errors: 0,
            current_warnings: 0,
        })
        .collect();

    for f in current {
        match changes.iter_mut().find(|c| c.file == f.file) {
            Some(change) => {
                change.current_errors = f.errors;
                change.current_warnings = f.warnings;
            }
            None => changes.push(FileChange {
                file: f.file.clone(),
                previous_errors: 0,
                previous_warnings: 0,
                current_errors: f.errors,
                current_warnings: f.warnings,
            }),
        }
    }

    changes.sort_by_key(|c| std::cmp::Reverse(c.total_change().unsigned_abs()));
    changes.truncate(MAX_FILE_CHANGES);
    changes
}

/// Render a comparison for the terminal.
#[must_use]
pub fn render(comparison: &Comparison, theme: &Theme) -> String {
    let mut out = String::new();
    writeln!(out, "{}", theme.title.paint("=== VERSION COMPARISON ===")).unwrap();
    writeln!(out, "Previous scan: {}", theme.info.paint(&comparison.previous.date)).unwrap();
    writeln!(out, "Current scan:  {}", theme.info.paint(&comparison.current.date)).unwrap();

    writeln!(out, "\n{}", theme.title.paint("=== CHANGES OVERVIEW ===")).unwrap();
    for category in &comparison.categories {
        writeln!(out, "{}: {}", category.label, category.format(theme)).unwrap();
    }

    if let Some(files) = &comparison.files {
        writeln!(out, "\n{}", theme.title.paint("=== FILE-LEVEL CHANGES ===")).unwrap();
        if files.is_empty() {
            writeln!(out, "No files with issues in either run.").unwrap();
        }
        for change in files {
            let style = if change.total_change() > 0 {
                theme.success
            } else {
                theme.error
            };
            writeln!(out, "\n{}", style.paint(&format!("{} {}", change.marker(), change.file))).unwrap();
            writeln!(
                out,
                "  Previous: {} errors, {} warnings",
                theme.error.paint(&change.previous_errors.to_string()),
                theme.warning.paint(&change.previous_warnings.to_string())
            )
            .unwrap();
            writeln!(
                out,
                "  Current:  {} errors, {} warnings",
                theme.error.paint(&change.current_errors.to_string()),
                theme.warning.paint(&change.current_warnings.to_string())
            )
            .unwrap();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunStats;

    fn file(name: &str, errors: u64, warnings: u64) -> FileStat {
        FileStat {
            file: name.to_string(),
            total: errors + warnings,
            errors,
            warnings,
        }
    }

    fn results(worst_files: Vec<FileStat>) -> LintResults {
        LintResults {
            timestamp: String::new(),
            stats: RunStats::default(),
            worst_files,
            issues_by_directory: vec![],
            rule_stats: vec![],
        }
    }

    #[test]
    fn test_needs_two_snapshots() {
        assert!(compare(&[], None, None).is_none());
        assert!(compare(&[Snapshot::new("a", 1, 0, 0)], None, None).is_none());
    }

    #[test]
    fn test_category_changes() {
        let history = vec![
            Snapshot::new("a", 99, 0, 0),
            Snapshot::new("b", 10, 4, 0),
            Snapshot::new("c", 8, 6, 0),
        ];
        let cmp = compare(&history, None, None).unwrap();

        assert_eq!(cmp.previous.date, "b");
        assert_eq!(cmp.categories.len(), 3);
        let theme = Theme::plain();
        assert_eq!(cmp.categories[0].format(&theme), "14 → 14 (no change)");
        assert_eq!(cmp.categories[1].format(&theme), "10 → 8 (↓ -2 (-20.0%))");
        assert_eq!(cmp.categories[2].format(&theme), "4 → 6 (↑ +2 (+50.0%))");
        assert!(cmp.files.is_none());
    }

    #[test]
    fn test_zero_previous_uses_floor() {
        let change = CategoryChange {
            label: "Errors",
            previous: 0,
            current: 3,
        };
        assert_eq!(change.format(&Theme::plain()), "0 → 3 (↑ +3 (+300.0%))");
    }

    #[test]
    fn test_extreme_counts_saturate() {
        let change = CategoryChange {
            label: "Total issues",
            previous: 0,
            current: u64::MAX,
        };
        assert_eq!(change.diff(), i64::MIN);

        let file = FileChange {
            file: "a.js".to_string(),
            previous_errors: u64::MAX,
            previous_warnings: u64::MAX,
            current_errors: 0,
            current_warnings: 0,
        };
        assert_eq!(file.total_change(), i64::MAX);
        assert_eq!(file.marker(), "↓");
    }

    #[test]
    fn test_formatting_row_only_when_present() {
        let history = vec![Snapshot::new("a", 1, 0, 2), Snapshot::new("b", 1, 0, 0)];
        let cmp = compare(&history, None, None).unwrap();
        assert_eq!(cmp.categories.last().unwrap().label, "Formatting");
    }

    #[test]
    fn test_file_changes_sorted_by_magnitude() {
        let history = vec![Snapshot::new("a", 1, 0, 0), Snapshot::new("b", 1, 0, 0)];
        let previous = results(vec![file("a.js", 5, 0), file("b.js", 2, 0), file("gone.js", 1, 0)]);
        let current = results(vec![file("b.js", 2, 0), file("a.js", 1, 0), file("new.js", 0, 4)]);

        let cmp = compare(&history, Some(&current), Some(&previous)).unwrap();
        let files = cmp.files.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(names, vec!["a.js", "new.js", "gone.js", "b.js"]);
        assert_eq!(files[0].marker(), "↓");
        assert_eq!(files[1].marker(), "↑");
        assert_eq!(files[3].marker(), "=");
    }

    #[test]
    fn test_render() {
        let history = vec![Snapshot::new("2024-01-01", 5, 0, 0), Snapshot::new("2024-01-02", 3, 0, 0)];
        let previous = results(vec![file("a.js", 5, 0)]);
        let current = results(vec![file("a.js", 3, 0)]);
        let cmp = compare(&history, Some(&current), Some(&previous)).unwrap();

        let out = render(&cmp, &Theme::plain());
        assert!(out.contains("Previous scan: 2024-01-01"));
        assert!(out.contains("Errors: 5 → 3 (↓ -2 (-40.0%))"));
        assert!(out.contains("↓ a.js"));
        assert!(out.contains("  Current:  3 errors, 0 warnings"));
    }
}
