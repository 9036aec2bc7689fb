//! Uniform in-memory representation of lint results and progress snapshots,
//! independent of the external tool that produced them. The aggregator turns
//! `FileResult`s into `LintResults`, which are persisted by the store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Rule key used for messages that carry no rule id (parse errors and the like).
pub const UNKNOWN_RULE: &str = "unknown";

/// Percentage of `part` relative to `base`. The denominator is floored at 1
/// so a zero baseline never divides by zero.
#[must_use]
pub fn percent_of(part: i64, base: u64) -> f64 {
    part as f64 * 100.0 / base.max(1) as f64
}

/// `before - after` as a signed count, saturating at the `i64` bounds.
#[must_use]
pub fn signed_change(before: u64, after: u64) -> i64 {
    let change = i128::from(before) - i128::from(after);
    i64::try_from(change).unwrap_or(if change < 0 { i64::MIN } else { i64::MAX })
}

/// The first ten characters of a date string (the calendar day for ISO dates).
#[must_use]
pub fn short_date(date: &str) -> &str {
    match date.char_indices().nth(10) {
        Some((idx, _)) => &date[..idx],
        None => date,
    }
}

/// Severity as reported by the linter: 2 = error, 1 = warning.
/// Any other value is treated as `Off` and not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Severity {
    Off,
    Warning,
    Error,
}

impl From<u8> for Severity {
    fn from(code: u8) -> Self {
        match code {
            2 => Severity::Error,
            1 => Severity::Warning,
            _ => Severity::Off,
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => 2,
            Severity::Warning => 1,
            Severity::Off => 0,
        }
    }
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueMessage {
    #[serde(default)]
    pub rule_id: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub message: String,
}

impl IssueMessage {
    /// The rule id, or [`UNKNOWN_RULE`] when absent or empty.
    #[must_use]
    pub fn rule_key(&self) -> &str {
        match self.rule_id.as_deref() {
            Some(rule) if !rule.is_empty() => rule,
            _ => UNKNOWN_RULE,
        }
    }
}

/// All findings for one linted file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub file_path: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<IssueMessage>,
}

impl FileResult {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            messages: Vec::new(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<IssueMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<IssueMessage>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One recorded lint run's aggregate counts.
///
/// `date` is kept verbatim as it appeared in the log header; use
/// [`Snapshot::timestamp`] to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: String,
    pub total: u64,
    pub errors: u64,
    pub warnings: u64,
    pub formatting: u64,
}

impl Snapshot {
    /// Build a snapshot whose total is the sum of its categories.
    pub fn new(date: impl Into<String>, errors: u64, warnings: u64, formatting: u64) -> Self {
        Self {
            date: date.into(),
            total: errors.saturating_add(warnings).saturating_add(formatting),
            errors,
            warnings,
            formatting,
        }
    }

    /// The header date interpreted as a point in time, if it is parseable.
    #[must_use]
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.date)
    }

    #[must_use]
    pub fn short_date(&self) -> &str {
        short_date(&self.date)
    }
}

/// Parse the date formats the log is known to contain: RFC 3339 timestamps,
/// plain `YYYY-MM-DD` days, and a few space-separated variants. Offsets are
/// normalised to UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Issue counts for one rule within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStat {
    pub rule: String,
    pub count: u64,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub warnings: u64,
}

impl RuleStat {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.rule == UNKNOWN_RULE
    }
}

/// Issue counts for one file with at least one finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub file: String,
    pub total: u64,
    pub errors: u64,
    pub warnings: u64,
}

/// Issue counts rolled up by the parent directory of each file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStat {
    pub directory: String,
    pub errors: u64,
    pub warnings: u64,
    pub total: u64,
}

/// Scalar summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total_files: u64,
    pub files_with_issues: u64,
    pub errors: u64,
    pub warnings: u64,
    /// `None` when the formatting check was disabled for the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<u64>,
}

/// The full structured bundle for one run, as written to the JSON slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResults {
    pub timestamp: String,
    pub stats: RunStats,
    #[serde(default)]
    pub worst_files: Vec<FileStat>,
    #[serde(default)]
    pub issues_by_directory: Vec<DirectoryStat>,
    #[serde(default)]
    pub rule_stats: Vec<RuleStat>,
}

impl LintResults {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.stats
            .errors
            .saturating_add(self.stats.warnings)
            .saturating_add(self.stats.formatting.unwrap_or(0))
    }

    /// The snapshot this run contributes to the progress log.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.timestamp.clone(),
            self.stats.errors,
            self.stats.warnings,
            self.stats.formatting.unwrap_or(0),
        )
    }

    /// The most frequent rule that has a real rule id.
    #[must_use]
    pub fn top_rule(&self) -> Option<&RuleStat> {
        self.rule_stats.iter().find(|r| !r.is_unknown())
    }
}
