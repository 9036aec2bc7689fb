//! Remediation: the advisory suggestion written under each log entry and the
//! `fix <rule>` workflow that drives the linter's autofix for one rule.

use std::collections::BTreeSet;

use crate::error::{LintrendError, Result};
use crate::model::{FileResult, RuleStat, Severity, UNKNOWN_RULE};
use crate::runner::{LintSource, RuleFixer};

/// Whether a rule belongs to the formatter rather than the linter.
#[must_use]
pub fn is_formatting_rule(rule: &str) -> bool {
    rule == "prettier" || rule.starts_with("prettier/")
}

/// Suggested next step for the most frequent rule. Returns `None` for the
/// unknown-rule sentinel, which has nothing to fix.
#[must_use]
pub fn suggestion(rule: &RuleStat, patterns: &[String]) -> Option<String> {
    if rule.is_unknown() || rule.rule.is_empty() {
        return None;
    }
    let command = if is_formatting_rule(&rule.rule) {
        format!("npx prettier --write {}", patterns.join(" "))
    } else {
        format!("npx eslint --fix . --rule \"{}: error\"", rule.rule)
    };
    Some(format!(
        "Suggestion: Focus on fixing \"{}\" issues ({} occurrences)\nTry running: {command}\n",
        rule.rule, rule.count
    ))
}

/// Reject rule ids that cannot be handed to the autofixer.
pub fn validate_rule(rule: &str) -> Result<()> {
    let rule = rule.trim();
    if rule.is_empty() || rule == UNKNOWN_RULE {
        return Err(LintrendError::UnknownRule(rule.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub file: String,
    pub line: u32,
    pub message: String,
}

/// Where one rule currently fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleUsage {
    pub rule: String,
    pub occurrences: Vec<Occurrence>,
    /// Affected files, sorted and deduplicated.
    pub files: Vec<String>,
}

impl RuleUsage {
    /// Collect every counted message for `rule`.
    #[must_use]
    pub fn collect(files: &[FileResult], rule: &str) -> Self {
        let mut occurrences = Vec::new();
        let mut affected = BTreeSet::new();
        for file in files {
            for msg in &file.messages {
                if msg.severity == Severity::Off || msg.rule_id.as_deref() != Some(rule) {
                    continue;
                }
                affected.insert(file.file_path.clone());
                occurrences.push(Occurrence {
                    file: file.file_path.clone(),
                    line: msg.line,
                    message: msg.message.clone(),
                });
            }
        }
        Self {
            rule: rule.to_string(),
            occurrences,
            files: affected.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.occurrences.len()
    }
}

/// Result of a `fix` run.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub before: RuleUsage,
    /// `None` when no fix was attempted (dry run, or nothing to fix).
    pub after: Option<RuleUsage>,
}

impl FixOutcome {
    #[must_use]
    pub fn fixed(&self) -> usize {
        self.after
            .as_ref()
            .map_or(0, |after| self.before.count().saturating_sub(after.count()))
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.after.as_ref().map_or(self.before.count(), RuleUsage::count)
    }
}

/// Count a rule's occurrences, apply the autofix for it unless `dry_run`,
/// then lint again to see what is left.
pub fn fix_rule(
    source: &dyn LintSource,
    fixer: &dyn RuleFixer,
    rule: &str,
    dry_run: bool,
) -> Result<FixOutcome> {
    validate_rule(rule)?;
    let rule = rule.trim();

    let before = RuleUsage::collect(&source.lint()?, rule);
    tracing::debug!(rule, count = before.count(), files = before.files.len(), "rule usage");

    if dry_run || before.count() == 0 {
        return Ok(FixOutcome {
            before,
            after: None,
        });
    }

    fixer.fix_rule(rule)?;
    let after = RuleUsage::collect(&source.lint()?, rule);
    Ok(FixOutcome {
        before,
        after: Some(after),
    })
}
