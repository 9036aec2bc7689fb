//! Trend statistics over an ordered sequence of snapshots.
//!
//! Snapshots are taken in log order, which is treated as chronological; they
//! are never re-sorted by date. Rates use a naive linear model: the first and
//! last snapshots define a straight line and projections extend it.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::model::{percent_of, signed_change, Snapshot};

/// Horizons, in days, used for forward projections.
pub const PROJECTION_HORIZONS: [u32; 3] = [7, 14, 30];

/// Result of analysing a snapshot sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    /// No snapshots at all.
    Empty,
    /// A single snapshot: current status only, nothing to compare.
    CurrentOnly { current: Snapshot },
    /// Two or more snapshots.
    Trend(TrendReport),
}

impl Analysis {
    #[must_use]
    pub fn report(&self) -> Option<&TrendReport> {
        match self {
            Analysis::Trend(report) => Some(report),
            _ => None,
        }
    }
}

/// Whether the issue count went down, stayed flat, or went up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Decreasing,
    Unchanged,
    Increasing,
}

/// Progress between two adjacent snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub from: String,
    pub to: String,
    pub issues_fixed: i64,
    /// Days between the two snapshots, floored at 1. `None` when either date
    /// is unparseable.
    pub days_between: Option<f64>,
    pub daily_rate: Option<f64>,
}

/// Projected counts some days after the last snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub days_ahead: u32,
    pub total: u64,
    pub errors: u64,
    pub warnings: u64,
}

/// Issues fixed per day, by category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyRates {
    pub total: f64,
    pub errors: f64,
    pub warnings: f64,
}

/// Comparison between the first and last snapshot of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub first: Snapshot,
    pub last: Snapshot,
    /// `first.total - last.total`; negative means issues were added.
    pub absolute_reduction: i64,
    /// `None` when the first snapshot had no issues, as there is no
    /// meaningful ratio to report.
    pub percent_reduction: Option<f64>,
    /// `None` when either date is unparseable.
    pub days_elapsed: Option<f64>,
    /// `absolute_reduction / max(1, days_elapsed)`.
    pub fix_rate_per_day: Option<f64>,
    /// Only present while issues are decreasing.
    pub projected_days_to_zero: Option<u64>,
    pub error_reduction: i64,
    pub warning_reduction: i64,
    pub formatting_reduction: i64,
    /// Per-pair progress; only filled in for three or more snapshots.
    pub steps: Vec<Step>,
    /// Only present while issues are decreasing.
    pub projections: Vec<Projection>,
}

impl TrendReport {
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self.absolute_reduction {
            r if r > 0 => Direction::Decreasing,
            0 => Direction::Unchanged,
            _ => Direction::Increasing,
        }
    }

    #[must_use]
    pub fn error_percent(&self) -> f64 {
        percent_of(self.error_reduction, self.first.errors)
    }

    #[must_use]
    pub fn warning_percent(&self) -> f64 {
        percent_of(self.warning_reduction, self.first.warnings)
    }

    #[must_use]
    pub fn formatting_percent(&self) -> f64 {
        percent_of(self.formatting_reduction, self.first.formatting)
    }

    /// Whether either end of the comparison recorded formatting issues.
    #[must_use]
    pub fn has_formatting(&self) -> bool {
        self.first.formatting > 0 || self.last.formatting > 0
    }

    #[must_use]
    pub fn daily_rates(&self) -> Option<DailyRates> {
        let denom = self.days_elapsed?.max(1.0);
        Some(DailyRates {
            total: self.absolute_reduction as f64 / denom,
            errors: self.error_reduction as f64 / denom,
            warnings: self.warning_reduction as f64 / denom,
        })
    }

    /// Calendar date at which the count is projected to reach zero.
    #[must_use]
    pub fn projected_completion(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_days(Days::new(self.projected_days_to_zero?))
    }

    /// One-line description of the overall change.
    #[must_use]
    pub fn describe(&self) -> String {
        let pct = self
            .percent_reduction
            .map(|p| format!(" ({:.1}%)", p.abs()))
            .unwrap_or_default();
        match self.direction() {
            Direction::Decreasing => format!("Issues fixed: {}{pct}", self.absolute_reduction),
            Direction::Unchanged | Direction::Increasing => format!(
                "Issues increased by {}{pct}",
                self.absolute_reduction.unsigned_abs()
            ),
        }
    }
}

/// Analyse a snapshot sequence in log order.
#[must_use]
pub fn analyze(snapshots: &[Snapshot]) -> Analysis {
    match snapshots {
        [] => Analysis::Empty,
        [only] => Analysis::CurrentOnly {
            current: only.clone(),
        },
        [first, .., last] => Analysis::Trend(build_report(snapshots, first, last)),
    }
}

fn build_report(snapshots: &[Snapshot], first: &Snapshot, last: &Snapshot) -> TrendReport {
    let absolute_reduction = signed_change(first.total, last.total);
    let percent_reduction = if first.total == 0 {
        None
    } else {
        Some(absolute_reduction as f64 * 100.0 / first.total as f64)
    };

    let days_elapsed = days_between(first, last);
    let fix_rate_per_day = days_elapsed.map(|days| absolute_reduction as f64 / days.max(1.0));
    let projected_days_to_zero = fix_rate_per_day
        .filter(|rate| *rate > 0.0)
        .map(|rate| (last.total as f64 / rate).ceil() as u64);

    let error_reduction = signed_change(first.errors, last.errors);
    let warning_reduction = signed_change(first.warnings, last.warnings);

    let projections = match (days_elapsed, fix_rate_per_day) {
        (Some(days), Some(rate)) if rate > 0.0 => {
            let denom = days.max(1.0);
            let error_rate = error_reduction as f64 / denom;
            let warning_rate = warning_reduction as f64 / denom;
            PROJECTION_HORIZONS
                .iter()
                .map(|&ahead| {
                    let d = f64::from(ahead);
                    Projection {
                        days_ahead: ahead,
                        total: extrapolate(last.total, rate, d),
                        errors: extrapolate(last.errors, error_rate, d),
                        warnings: extrapolate(last.warnings, warning_rate, d),
                    }
                })
                .collect()
        }
        _ => Vec::new(),
    };

    let steps = if snapshots.len() >= 3 {
        snapshots
            .windows(2)
            .map(|pair| {
                let (prev, curr) = (&pair[0], &pair[1]);
                let issues_fixed = signed_change(prev.total, curr.total);
                let days_between = days_between(prev, curr).map(|d| d.max(1.0));
                Step {
                    from: prev.date.clone(),
                    to: curr.date.clone(),
                    issues_fixed,
                    days_between,
                    daily_rate: days_between.map(|d| issues_fixed as f64 / d),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    TrendReport {
        first: first.clone(),
        last: last.clone(),
        absolute_reduction,
        percent_reduction,
        days_elapsed,
        fix_rate_per_day,
        projected_days_to_zero,
        error_reduction,
        warning_reduction,
        formatting_reduction: signed_change(first.formatting, last.formatting),
        steps,
        projections,
    }
}

/// Fractional days from `a` to `b`, or `None` if either date is unparseable.
fn days_between(a: &Snapshot, b: &Snapshot) -> Option<f64> {
    let elapsed = b.timestamp()? - a.timestamp()?;
    Some(elapsed.num_seconds() as f64 / 86_400.0)
}

/// Linear projection of `current` after `days` at `rate` fixes per day,
/// clamped at zero.
fn extrapolate(current: u64, rate: f64, days: f64) -> u64 {
    (current as f64 - rate * days).round().max(0.0) as u64
}
