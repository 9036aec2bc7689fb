/// Parser for ESLint's `--format json` report.
///
/// The report is a JSON array with one object per linted file:
///   [{ "filePath": "...", "messages": [{ "ruleId": "semi"|null,
///      "severity": 1|2, "line": 3, "message": "..." }, ...], ... }, ...]
///
/// Any other keys (fix data, counts, source) are ignored.
use crate::error::{LintrendError, Result};
use crate::model::FileResult;

const TOOL: &str = "eslint";

/// Parse an ESLint JSON report.
///
/// Fails with `UnparseableOutput` on empty or non-JSON input; callers decide
/// whether that is fatal.
pub fn parse(input: &[u8]) -> Result<Vec<FileResult>> {
    let text = std::str::from_utf8(input).map_err(|e| unparseable(e.to_string()))?;
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Err(unparseable("no output".to_string()));
    }
    serde_json::from_str(text).map_err(|e| unparseable(e.to_string()))
}

fn unparseable(reason: String) -> LintrendError {
    LintrendError::UnparseableOutput {
        tool: TOOL.to_string(),
        reason,
    }
}
