//! Count files reported by `prettier --check`.
//!
//! The check prints a fixed header line (`Checking formatting...`), one
//! `[warn] <path>` line per unformatted file and, depending on the version,
//! a closing summary line.

const SUMMARY_MARKERS: [&str; 2] = ["Code style issues", "All matched files use Prettier"];

/// Number of files needing reformatting: non-empty output lines less the
/// header, not counting the summary line.
#[must_use]
pub fn count_unformatted(output: &str) -> u64 {
    let lines = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !SUMMARY_MARKERS.iter().any(|m| line.contains(m)))
        .count();
    lines.saturating_sub(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_with_issues() {
        let output = "\
Checking formatting...
[warn] src/a.ts
[warn] src/b/c.tsx
[warn] Code style issues found in 2 files. Run Prettier with --write to fix.
";
        assert_eq!(count_unformatted(output), 2);
    }

    #[test]
    fn test_count_clean() {
        let output = "Checking formatting...\nAll matched files use Prettier code style!\n";
        assert_eq!(count_unformatted(output), 0);
    }

    #[test]
    fn test_count_empty_output() {
        assert_eq!(count_unformatted(""), 0);
        assert_eq!(count_unformatted("\n\n"), 0);
    }
}
