/// Reader and writer for the append-only progress log.
///
/// Grammar (line oriented):
///   ===== <date> =====
///   <N> problems (<E> errors, <W> warnings[, <F> formatting])
///
/// A header line sets the date for every count line after it until the next
/// header. Everything else (blank lines, the "Top issues by rule:" block,
/// suggestions) is written for humans and skipped on read. The log is meant
/// to be hand-editable, so lines that don't match are ignored rather than
/// reported.
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{RuleStat, Snapshot};

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^===== (.+) =====$").unwrap());

static COUNTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+) problems? \((\d+) errors?, (\d+) warnings?(?:, (\d+) formatting)?\)$")
        .unwrap()
});

/// Counts above this are treated as malformed, so any two counts can be
/// subtracted as `i64`.
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// Parse log text into snapshots, in file order.
///
/// The returned iterator is lazy and cheap to clone, so callers can walk the
/// same log more than once.
pub fn parse_log(content: &str) -> Entries<'_> {
    Entries {
        lines: content.lines(),
        current_date: "",
    }
}

/// Lazy iterator over the snapshots in a log.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    lines: std::str::Lines<'a>,
    current_date: &'a str,
}

impl Iterator for Entries<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        for raw in self.lines.by_ref() {
            let line = raw.trim_end();
            if let Some(caps) = HEADER_RE.captures(line) {
                self.current_date = caps.get(1).map_or("", |m| m.as_str());
                continue;
            }
            if let Some(snapshot) = parse_counts(line, self.current_date) {
                return Some(snapshot);
            }
        }
        None
    }
}

/// Parse a single counts line. Returns `None` for anything that doesn't
/// match the grammar, including counts above [`MAX_COUNT`].
fn parse_counts(line: &str, date: &str) -> Option<Snapshot> {
    let caps = COUNTS_RE.captures(line)?;
    let number = |idx: usize| -> Option<u64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse::<u64>().ok().filter(|n| *n <= MAX_COUNT),
            None => Some(0),
        }
    };
    Some(Snapshot {
        date: date.to_string(),
        total: number(1)?,
        errors: number(2)?,
        warnings: number(3)?,
        formatting: number(4)?,
    })
}

/// Optional human-readable detail appended below the counts line.
pub struct EntryDetails<'a> {
    /// Rule stats, already sorted by descending count.
    pub rules: &'a [RuleStat],
    /// Maximum number of rules to list.
    pub limit: usize,
    /// Remediation text for the top rule, if any.
    pub suggestion: Option<String>,
}

/// Format the `===== <date> =====` header line.
#[must_use]
pub fn format_header(date: &str) -> String {
    format!("===== {date} =====\n")
}

/// Format the counts line. The formatting group is only written when the
/// formatting check ran, which keeps older readers compatible.
#[must_use]
pub fn format_counts(snapshot: &Snapshot, with_formatting: bool) -> String {
    let Snapshot {
        total,
        errors,
        warnings,
        formatting,
        ..
    } = snapshot;
    if with_formatting {
        format!("{total} problems ({errors} errors, {warnings} warnings, {formatting} formatting)\n")
    } else {
        format!("{total} problems ({errors} errors, {warnings} warnings)\n")
    }
}

/// Format a complete log entry, ready to be appended.
#[must_use]
pub fn format_entry(
    snapshot: &Snapshot,
    with_formatting: bool,
    details: Option<&EntryDetails<'_>>,
) -> String {
    let mut out = format_header(&snapshot.date);
    out.push_str(&format_counts(snapshot, with_formatting));

    if let Some(details) = details.filter(|d| !d.rules.is_empty() && d.limit > 0) {
        out.push_str("\nTop issues by rule:\n");
        for rule in details.rules.iter().take(details.limit) {
            writeln!(out, "- {}: {} occurrences", rule.rule, rule.count).unwrap();
        }
        if let Some(ref suggestion) = details.suggestion {
            out.push('\n');
            out.push_str(suggestion);
            if !suggestion.ends_with('\n') {
                out.push('\n');
            }
        }
    }

    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, count: u64) -> RuleStat {
        RuleStat {
            rule: name.to_string(),
            count,
            errors: count,
            warnings: 0,
        }
    }

    #[test]
    fn test_parse_two_entries() {
        let log = "\
===== 2024-01-01 =====
100 problems (80 errors, 20 warnings)

===== 2024-01-08 =====
60 problems (40 errors, 20 warnings)
";
        let entries: Vec<_> = parse_log(log).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, "2024-01-01");
        assert_eq!(entries[0].total, 100);
        assert_eq!(entries[0].errors, 80);
        assert_eq!(entries[0].warnings, 20);
        assert_eq!(entries[0].formatting, 0);
        assert_eq!(entries[1].date, "2024-01-08");
        assert_eq!(entries[1].total, 60);
    }

    #[test]
    fn test_parse_formatting_group() {
        let log = "===== 2024-02-01 =====\n17 problems (10 errors, 4 warnings, 3 formatting)\n";
        let entries: Vec<_> = parse_log(log).collect();
        assert_eq!(entries, vec![Snapshot::new("2024-02-01", 10, 4, 3)]);
    }

    #[test]
    fn test_parse_singular_forms() {
        let log = "===== d =====\n1 problem (1 error, 0 warning)\n";
        let entries: Vec<_> = parse_log(log).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].errors, 1);
    }

    #[test]
    fn test_parse_without_header_uses_empty_date() {
        let entries: Vec<_> = parse_log("5 problems (5 errors, 0 warnings)\n").collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, "");
    }

    #[test]
    fn test_parse_skips_detail_block_and_garbage() {
        let log = "\
===== 2024-03-01T10:00:00Z =====
12 problems (10 errors, 2 warnings)

Top issues by rule:
- no-undef: 8 occurrences
- semi: 4 occurrences

Suggestion: Focus on fixing \"no-undef\" issues (8 occurrences)
Try running: npx eslint --fix . --rule \"no-undef: error\"

this line was typed by hand
12 problems (10 errors)
";
        let entries: Vec<_> = parse_log(log).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, "2024-03-01T10:00:00Z");
    }

    #[test]
    fn test_parse_invalid_date_passes_through() {
        let log = "===== not a date =====\n3 problems (2 errors, 1 warnings)\n";
        let entries: Vec<_> = parse_log(log).collect();
        assert_eq!(entries[0].date, "not a date");
        assert!(entries[0].timestamp().is_none());
    }

    #[test]
    fn test_parse_windows_line_endings() {
        let log = "===== 2024-01-01 =====\r\n4 problems (4 errors, 0 warnings)\r\n";
        let entries: Vec<_> = parse_log(log).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, "2024-01-01");
    }

    #[test]
    fn test_parse_overflowing_number_is_skipped() {
        let log = "99999999999999999999999 problems (1 errors, 0 warnings)\n";
        assert_eq!(parse_log(log).count(), 0);
    }

    #[test]
    fn test_parse_count_above_i64_is_skipped() {
        let log = "\
===== 2024-01-01 =====
0 problems (0 errors, 0 warnings)
===== 2024-01-02 =====
9223372036854775808 problems (0 errors, 0 warnings)
===== 2024-01-03 =====
9223372036854775807 problems (9223372036854775807 errors, 0 warnings)
";
        let snaps: Vec<_> = parse_log(log).collect();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[1].total, MAX_COUNT);
    }

    #[test]
    fn test_entries_are_restartable() {
        let log = "===== a =====\n1 problems (1 errors, 0 warnings)\n";
        let entries = parse_log(log);
        assert_eq!(entries.clone().count(), 1);
        assert_eq!(entries.count(), 1);
    }

    #[test]
    fn test_counts_round_trip() {
        for (e, w, f) in [(0, 0, 0), (1, 0, 0), (0, 7, 2), (80, 20, 0), (123, 456, 789)] {
            let with = Snapshot::new("d", e, w, f);
            let line = format!("===== d =====\n{}", format_counts(&with, true));
            assert_eq!(parse_log(&line).next().unwrap(), with);

            let without = Snapshot::new("d", e, w, 0);
            let line = format!("===== d =====\n{}", format_counts(&without, false));
            assert_eq!(parse_log(&line).next().unwrap(), without);
        }
    }

    #[test]
    fn test_format_entry_plain() {
        let snap = Snapshot::new("2024-01-01", 3, 2, 0);
        assert_eq!(
            format_entry(&snap, false, None),
            "===== 2024-01-01 =====\n5 problems (3 errors, 2 warnings)\n\n"
        );
    }

    #[test]
    fn test_format_entry_with_details() {
        let snap = Snapshot::new("2024-01-01", 12, 0, 1);
        let rules = vec![rule("no-undef", 8), rule("semi", 3), rule("eqeqeq", 1)];
        let details = EntryDetails {
            rules: &rules,
            limit: 2,
            suggestion: Some("Suggestion: fix it".to_string()),
        };
        let entry = format_entry(&snap, true, Some(&details));
        assert_eq!(
            entry,
            "===== 2024-01-01 =====\n\
             13 problems (12 errors, 0 warnings, 1 formatting)\n\
             \n\
             Top issues by rule:\n\
             - no-undef: 8 occurrences\n\
             - semi: 3 occurrences\n\
             \n\
             Suggestion: fix it\n\
             \n"
        );
        // The detail block never produces extra snapshots.
        assert_eq!(parse_log(&entry).count(), 1);
    }
}
