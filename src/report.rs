//! Renderers for the recorded history: terminal chart, HTML page and JSON.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::model::{short_date, LintResults, Snapshot};
use crate::theme::Theme;
use crate::trend::{analyze, Analysis, Direction, TrendReport};

const CHART_WIDTH: u64 = 40;
const DIR_BAR_WIDTH: u64 = 20;
const TOP_N: usize = 5;
/// Below this relative reduction the chart suggests running lint in CI.
const SLOW_PROGRESS_RATIO: f64 = -0.1;

/// Everything a renderer needs: the log history, its analysis, and the
/// detailed breakdown of the latest run when one was saved.
pub struct ChartData<'a> {
    pub snapshots: &'a [Snapshot],
    pub analysis: Analysis,
    pub current: Option<&'a LintResults>,
    /// Reference day for projected completion dates.
    pub today: NaiveDate,
}

impl<'a> ChartData<'a> {
    #[must_use]
    pub fn new(snapshots: &'a [Snapshot], current: Option<&'a LintResults>, today: NaiveDate) -> Self {
        Self {
            snapshots,
            analysis: analyze(snapshots),
            current,
            today,
        }
    }

    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }
}

/// Trait for rendering chart data.
pub trait ReportFormatter {
    fn format(&self, data: &ChartData<'_>) -> String;
}

/// Relative progress of a run against the worst run, as a whole percent,
/// and the length of the "remaining" part of its bar.
fn progress(total: u64, max: u64) -> (u64, u64) {
    if max == 0 {
        return (100, 0);
    }
    let remaining = scale(total, max, 100, u128::div_ceil);
    (100u64.saturating_sub(remaining), scale(total, max, CHART_WIDTH, |a, b| a / b))
}

/// `value * width / max` without overflow; `value` must not exceed `max`.
fn scale(value: u64, max: u64, width: u64, divide: fn(u128, u128) -> u128) -> u64 {
    let scaled = divide(u128::from(value) * u128::from(width), u128::from(max.max(1)));
    u64::try_from(scaled).unwrap_or(width)
}

fn display_dir(dir: &str) -> &str {
    if dir.is_empty() {
        "."
    } else {
        dir
    }
}

/// Improvement suggestions derived from the history and the latest run.
#[must_use]
pub fn suggestions(snapshots: &[Snapshot], current: &LintResults) -> Vec<String> {
    let Some(worst) = current.worst_files.first() else {
        return Vec::new();
    };

    let mut out = vec![
        format!("Focus on fixing errors in {} ({} errors)", worst.file, worst.errors),
        "Set aside time to address warnings systematically".to_string(),
    ];
    if let [first, .., last] = snapshots {
        let change = (last.total as f64 - first.total as f64) / first.total.max(1) as f64;
        if change > SLOW_PROGRESS_RATIO {
            out.push("Consider integrating linting into your CI/CD pipeline".to_string());
        }
    }
    match current.top_rule() {
        Some(rule) => out.push(format!(
            "Review rule configurations for frequently violated rules (most frequent: {})",
            rule.rule
        )),
        None => out.push("Review rule configurations for frequently violated rules".to_string()),
    }
    if current.issues_by_directory.len() > 3 {
        let dir = &current.issues_by_directory[0].directory;
        out.push(format!("Consider refactoring code in {}", display_dir(dir)));
    }
    out
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// ASCII chart for the terminal.
pub struct TextFormatter {
    pub theme: Theme,
}

impl ReportFormatter for TextFormatter {
    fn format(&self, data: &ChartData<'_>) -> String {
        let t = &self.theme;
        let mut out = String::new();

        if data.snapshots.is_empty() {
            writeln!(out, "{}", t.warning.paint("No data entries found in the progress log.")).unwrap();
            out.push_str("Entries look like:\n===== DATE =====\nX problems (Y errors, Z warnings)\n");
            return out;
        }

        writeln!(out, "{}", t.title.paint("=== LINT PROGRESS CHART ===")).unwrap();
        writeln!(out, "{}", t.option.paint("Date       | Errors | Warnings | Format | Progress")).unwrap();
        writeln!(out, "{}", "-".repeat(70)).unwrap();

        let max = data.snapshots.iter().map(|s| s.total).max().unwrap_or(0);
        for snap in data.snapshots {
            let (pct, remaining) = progress(snap.total, max);
            let bar = format!(
                "{}{} {pct}%",
                "█".repeat((CHART_WIDTH - remaining) as usize),
                "░".repeat(remaining as usize)
            );
            let style = match pct {
                p if p >= 75 => t.success,
                p if p >= 50 => t.info,
                p if p >= 25 => t.warning,
                _ => t.error,
            };
            writeln!(
                out,
                "{:<10} | {} | {} | {} | {}",
                snap.short_date(),
                t.error.paint(&format!("{:>6}", snap.errors)),
                t.warning.paint(&format!("{:>8}", snap.warnings)),
                t.info.paint(&format!("{:>6}", snap.formatting)),
                style.paint(&bar)
            )
            .unwrap();
        }

        match &data.analysis {
            Analysis::Empty => {}
            Analysis::CurrentOnly { current } => self.current_status(&mut out, current),
            Analysis::Trend(report) => self.trend(&mut out, report, data.today),
        }

        if let Some(current) = data.current {
            self.breakdown(&mut out, current);
            writeln!(out, "\n{}", t.title.paint("=== IMPROVEMENT SUGGESTIONS ===")).unwrap();
            let tips = suggestions(data.snapshots, current);
            if tips.is_empty() {
                writeln!(out, "{} Your codebase has no major linting issues.", t.success.paint("Great job!")).unwrap();
            }
            for (i, tip) in tips.iter().enumerate() {
                writeln!(out, "{} {tip}", t.info.paint(&format!("{}.", i + 1))).unwrap();
            }
        }

        out
    }
}

impl TextFormatter {
    fn current_status(&self, out: &mut String, snap: &Snapshot) {
        let t = &self.theme;
        writeln!(out, "\n{}", t.title.paint("=== CURRENT STATUS ===")).unwrap();
        writeln!(out, "Total issues: {}", snap.total).unwrap();
        writeln!(out, "Errors: {}", t.error.paint(&snap.errors.to_string())).unwrap();
        writeln!(out, "Warnings: {}", t.warning.paint(&snap.warnings.to_string())).unwrap();
        if snap.formatting > 0 {
            writeln!(out, "Formatting: {}", t.info.paint(&snap.formatting.to_string())).unwrap();
        }
        writeln!(out, "{}", t.dim.paint("Not enough data for trend analysis: record at least two runs.")).unwrap();
    }

    fn trend(&self, out: &mut String, report: &TrendReport, today: NaiveDate) {
        let t = &self.theme;
        writeln!(out, "\n{}", t.title.paint("=== TREND ANALYSIS ===")).unwrap();
        writeln!(out, "Starting issues: {}", report.first.total).unwrap();
        writeln!(out, "Current issues: {}", report.last.total).unwrap();
        let style = match report.direction() {
            Direction::Decreasing => t.success,
            Direction::Unchanged => t.info,
            Direction::Increasing => t.error,
        };
        writeln!(out, "{}", style.paint(&report.describe())).unwrap();

        match (report.fix_rate_per_day, report.projected_days_to_zero) {
            (Some(rate), Some(days)) => {
                writeln!(out, "Average fix rate: {}", t.info.paint(&format!("{rate:.1} issues per day"))).unwrap();
                let around = report
                    .projected_completion(today)
                    .map(|d| format!(" (around {})", t.highlight.paint(&d.format("%Y-%m-%d").to_string())))
                    .unwrap_or_default();
                writeln!(out, "Estimated completion: {days} days{around}").unwrap();
            }
            (None, _) => {
                writeln!(out, "{}", t.dim.paint("Dates could not be read, so no rate or projection is available.")).unwrap();
            }
            (Some(_), None) => {
                writeln!(out, "{}", t.dim.paint("No completion estimate while issues are not decreasing.")).unwrap();
            }
        }

        writeln!(out, "\n{}", t.title.paint("=== DETAILED ANALYSIS ===")).unwrap();
        writeln!(
            out,
            "Error reduction: {}",
            t.error.paint(&format!("{} ({:.1}%)", report.error_reduction, report.error_percent()))
        )
        .unwrap();
        writeln!(
            out,
            "Warning reduction: {}",
            t.warning.paint(&format!("{} ({:.1}%)", report.warning_reduction, report.warning_percent()))
        )
        .unwrap();
        if report.has_formatting() {
            writeln!(
                out,
                "Formatting reduction: {}",
                t.info.paint(&format!("{} ({:.1}%)", report.formatting_reduction, report.formatting_percent()))
            )
            .unwrap();
        }

        if let Some(rates) = report.daily_rates() {
            writeln!(out, "\nDaily rates:").unwrap();
            writeln!(out, "- Errors fixed per day: {}", t.error.paint(&format!("{:.2}", rates.errors))).unwrap();
            writeln!(out, "- Warnings fixed per day: {}", t.warning.paint(&format!("{:.2}", rates.warnings))).unwrap();
            writeln!(out, "- Total issues fixed per day: {}", t.info.paint(&format!("{:.2}", rates.total))).unwrap();
        }

        if !report.projections.is_empty() {
            writeln!(out, "\n{}", t.title.paint("=== PROJECTED TREND (NEXT 30 DAYS) ===")).unwrap();
            writeln!(out, "{}", t.option.paint("Days from now | Total | Errors | Warnings")).unwrap();
            writeln!(out, "{}", "-".repeat(50)).unwrap();
            for p in &report.projections {
                writeln!(out, "{:>13} | {:>5} | {:>6} | {:>8}", p.days_ahead, p.total, p.errors, p.warnings).unwrap();
            }
        }

        if !report.steps.is_empty() {
            writeln!(out, "\nProgress over time:").unwrap();
            for step in &report.steps {
                let span = format!("{} → {}", short_date(&step.from), short_date(&step.to));
                match step.daily_rate {
                    Some(rate) => {
                        let style = if step.issues_fixed > 0 { t.success } else { t.error };
                        writeln!(out, "{span}: {}", style.paint(&format!("{rate:.2} issues/day"))).unwrap();
                    }
                    None => writeln!(out, "{span}: {} issues fixed", step.issues_fixed).unwrap(),
                }
            }
        }
    }

    fn breakdown(&self, out: &mut String, current: &LintResults) {
        let t = &self.theme;
        if !current.worst_files.is_empty() {
            writeln!(out, "\n{}", t.title.paint("=== FILES WITH MOST ISSUES ===")).unwrap();
            for (i, file) in current.worst_files.iter().take(TOP_N).enumerate() {
                writeln!(
                    out,
                    "{}. {}: {} errors, {} warnings",
                    i + 1,
                    file.file,
                    t.error.paint(&file.errors.to_string()),
                    t.warning.paint(&file.warnings.to_string())
                )
                .unwrap();
            }
        }

        if let Some(worst) = current.issues_by_directory.first() {
            writeln!(out, "\n{}", t.title.paint("=== DIRECTORY BREAKDOWN ===")).unwrap();
            let max = worst.total.max(1);
            for (i, dir) in current.issues_by_directory.iter().take(TOP_N).enumerate() {
                let bar = "█".repeat(scale(dir.total, max, DIR_BAR_WIDTH, |a, b| a / b) as usize);
                writeln!(
                    out,
                    "{}. {:<25} : {bar} {} ({} errors, {} warnings)",
                    i + 1,
                    display_dir(&dir.directory),
                    dir.total,
                    t.error.paint(&dir.errors.to_string()),
                    t.warning.paint(&dir.warnings.to_string())
                )
                .unwrap();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

const HTML_STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 2rem auto; max-width: 1100px; color: #222; }
h1 { border-bottom: 2px solid #3a6ea5; padding-bottom: .4rem; }
.cards { display: flex; gap: 1rem; flex-wrap: wrap; }
.card { flex: 1; min-width: 160px; padding: 1rem; border-radius: 6px; background: #f4f6f8; }
.card .value { font-size: 2rem; font-weight: bold; }
.errors .value { color: #c0392b; }
.warnings .value { color: #d68910; }
.formatting .value { color: #2874a6; }
table { border-collapse: collapse; width: 100%; margin-bottom: 2rem; }
th, td { text-align: left; padding: .4rem .6rem; border-bottom: 1px solid #ddd; }
th { background: #3a6ea5; color: #fff; }
.muted { color: #777; }
";

/// Escape text for use in HTML element content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Self-contained HTML report.
pub struct HtmlFormatter {
    /// Shown in the page header.
    pub generated_at: String,
}

impl ReportFormatter for HtmlFormatter {
    fn format(&self, data: &ChartData<'_>) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Linting Report</title>\n<style>\n");
        html.push_str(HTML_STYLE);
        html.push_str("</style>\n</head>\n<body>\n<h1>Linting Report</h1>\n");
        writeln!(html, "<p class=\"muted\">Generated {}</p>", escape_html(&self.generated_at)).unwrap();

        html.push_str("<h2>Summary</h2>\n<div class=\"cards\">\n");
        let latest = data.snapshots.last();
        let (total, errors, warnings, formatting) = match (data.current, latest) {
            (Some(cur), _) => (
                cur.total(),
                cur.stats.errors,
                cur.stats.warnings,
                cur.stats.formatting.unwrap_or(0),
            ),
            (None, Some(snap)) => (snap.total, snap.errors, snap.warnings, snap.formatting),
            (None, None) => (0, 0, 0, 0),
        };
        for (class, label, value) in [
            ("total", "Total issues", total),
            ("errors", "Errors", errors),
            ("warnings", "Warnings", warnings),
            ("formatting", "Formatting", formatting),
        ] {
            writeln!(
                html,
                "<div class=\"card {class}\"><div class=\"label\">{label}</div><div class=\"value\">{value}</div></div>"
            )
            .unwrap();
        }
        html.push_str("</div>\n");

        html.push_str("<h2>Trend Analysis</h2>\n");
        match &data.analysis {
            Analysis::Empty => html.push_str("<p class=\"muted\">No runs recorded yet.</p>\n"),
            Analysis::CurrentOnly { .. } => {
                html.push_str("<p class=\"muted\">Not enough data for trend analysis: record at least two runs.</p>\n");
            }
            Analysis::Trend(report) => {
                writeln!(html, "<p>{}</p>", escape_html(&report.describe())).unwrap();
                if let (Some(rate), Some(days)) = (report.fix_rate_per_day, report.projected_days_to_zero) {
                    writeln!(html, "<p>Average fix rate: {rate:.1} issues per day</p>").unwrap();
                    let around = report
                        .projected_completion(data.today)
                        .map(|d| format!(" (around {})", d.format("%Y-%m-%d")))
                        .unwrap_or_default();
                    writeln!(html, "<p>Estimated completion: {days} days{around}</p>").unwrap();
                }
            }
        }

        if !data.snapshots.is_empty() {
            html.push_str("<table id=\"historyTable\">\n<thead><tr><th>Date</th><th>Total</th><th>Errors</th><th>Warnings</th><th>Formatting</th></tr></thead>\n<tbody>\n");
            for snap in data.snapshots {
                writeln!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&snap.date),
                    snap.total,
                    snap.errors,
                    snap.warnings,
                    snap.formatting
                )
                .unwrap();
            }
            html.push_str("</tbody>\n</table>\n");
        }

        match data.current {
            Some(cur) => {
                html_table(
                    &mut html,
                    "Issues by Rule",
                    "rulesTable",
                    "Rule",
                    cur.rule_stats.iter().map(|r| (r.rule.as_str(), r.count, r.errors, r.warnings)),
                );
                html_table(
                    &mut html,
                    "Issues by File",
                    "filesTable",
                    "File",
                    cur.worst_files.iter().map(|f| (f.file.as_str(), f.total, f.errors, f.warnings)),
                );
                html_table(
                    &mut html,
                    "Issues by Directory",
                    "directoriesTable",
                    "Directory",
                    cur.issues_by_directory
                        .iter()
                        .map(|d| (display_dir(&d.directory), d.total, d.errors, d.warnings)),
                );
            }
            None => html.push_str("<p class=\"muted\">No detailed results saved yet.</p>\n"),
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn html_table<'a>(
    html: &mut String,
    heading: &str,
    id: &str,
    first_column: &str,
    rows: impl Iterator<Item = (&'a str, u64, u64, u64)>,
) {
    writeln!(html, "<h2>{heading}</h2>").unwrap();
    writeln!(
        html,
        "<table id=\"{id}\">\n<thead><tr><th>{first_column}</th><th>Total</th><th>Errors</th><th>Warnings</th></tr></thead>\n<tbody>"
    )
    .unwrap();
    for (name, total, errors, warnings) in rows {
        writeln!(
            html,
            "<tr><td>{}</td><td>{total}</td><td>{errors}</td><td>{warnings}</td></tr>",
            escape_html(name)
        )
        .unwrap();
    }
    html.push_str("</tbody>\n</table>\n");
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Machine-readable export of the history and its analysis.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, data: &ChartData<'_>) -> String {
        let value = serde_json::json!({
            "snapshots": data.snapshots,
            "analysis": data.analysis,
            "current": data.current,
        });
        format!("{value:#}\n")
    }
}
