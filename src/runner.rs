//! External tool invocation.
//!
//! Provides the [`LintSource`], [`FormatSource`] and [`RuleFixer`] traits
//! that abstract over where lint findings and formatting counts come from,
//! plus the ESLint/Prettier implementations that shell out with a timeout.

use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{LintrendError, Result};
use crate::model::FileResult;
use crate::parsers::{eslint, prettier};
use crate::spinner::Spinner;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A source of per-file lint findings.
pub trait LintSource {
    fn lint(&self) -> Result<Vec<FileResult>>;
}

/// A source of the number of files that need reformatting.
pub trait FormatSource {
    fn unformatted_count(&self) -> Result<u64>;
}

/// Something that can apply the linter's autofix for a single rule.
pub trait RuleFixer {
    fn fix_rule(&self, rule: &str) -> Result<()>;
}

/// ESLint run over a set of glob patterns.
pub struct Eslint {
    pub command: Vec<String>,
    pub patterns: Vec<String>,
    pub timeout: Duration,
}

impl LintSource for Eslint {
    fn lint(&self) -> Result<Vec<FileResult>> {
        let output = ToolCommand::new(&self.command)?
            .args(&self.patterns)
            .args(["--format", "json", "--max-warnings=9999"])
            .timeout(self.timeout)
            .progress("Running ESLint")
            .run()?;

        // A non-zero exit only means findings were reported, unless there is
        // nothing on stdout to parse.
        if output.stdout.trim().is_empty() && !output.status.success() {
            return Err(output.into_failure(&self.command));
        }
        eslint::parse(output.stdout.as_bytes())
    }
}

impl RuleFixer for Eslint {
    fn fix_rule(&self, rule: &str) -> Result<()> {
        let rule_override = serde_json::json!({ rule: "error" }).to_string();
        let output = ToolCommand::new(&self.command)?
            .args(&self.patterns)
            .args(["--fix", "--rule"])
            .arg(rule_override)
            .timeout(self.timeout)
            .progress(format!("Fixing {rule}"))
            .run()?;

        // Exit code 1 means problems remain after fixing; 2 is a crash or
        // configuration error.
        match output.status.code() {
            Some(0 | 1) => Ok(()),
            _ => Err(output.into_failure(&self.command)),
        }
    }
}

/// `prettier --check` run over a set of glob patterns.
pub struct Prettier {
    pub command: Vec<String>,
    pub patterns: Vec<String>,
    pub timeout: Duration,
}

impl FormatSource for Prettier {
    fn unformatted_count(&self) -> Result<u64> {
        let output = ToolCommand::new(&self.command)?
            .arg("--check")
            .args(&self.patterns)
            .timeout(self.timeout)
            .progress("Running Prettier check")
            .run()?;

        match output.status.code() {
            Some(0 | 1) => {
                let combined = format!("{}\n{}", output.stdout, output.stderr);
                Ok(prettier::count_unformatted(&combined))
            }
            _ => Err(output.into_failure(&self.command)),
        }
    }
}

// ---------------------------------------------------------------------------
// Process execution
// ---------------------------------------------------------------------------

/// Captured result of a finished tool run.
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    fn into_failure(self, command: &[String]) -> LintrendError {
        LintrendError::ToolFailed {
            tool: command.join(" "),
            status: self.status.to_string(),
            stderr: self.stderr.trim().to_string(),
        }
    }
}

/// A command line with a deadline.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    progress: Option<String>,
}

impl ToolCommand {
    /// Build from a `[program, args...]` command line.
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| LintrendError::Config("tool command is empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: Duration::from_secs(60),
            progress: None,
        })
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Show a spinner with this label while the command runs.
    #[must_use]
    pub fn progress(mut self, label: impl Into<String>) -> Self {
        self.progress = Some(label.into());
        self
    }

    /// Run to completion, killing the child if it outlives the timeout.
    ///
    /// A missing executable is reported as `ToolMissing` and an expired
    /// deadline as `Timeout`. Any exit status is returned as-is.
    pub fn run(&self) -> Result<ToolOutput> {
        tracing::debug!(program = %self.program, args = ?self.args, "spawning tool");
        let started = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LintrendError::ToolMissing {
                    tool: self.program.clone(),
                },
                _ => LintrendError::Io(e),
            })?;

        let _spinner = self.progress.as_ref().map(Spinner::start);

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match wait_with_deadline(&mut child, started + self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program = %self.program, "tool timed out and was killed");
                return Err(LintrendError::Timeout {
                    tool: self.program.clone(),
                    secs: self.timeout.as_millis().div_ceil(1000) as u64,
                });
            }
        };

        let output = ToolOutput {
            status,
            stdout: collect(stdout),
            stderr: collect(stderr),
        };
        tracing::debug!(
            program = %self.program,
            status = %output.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            stdout_bytes = output.stdout.len(),
            "tool finished"
        );
        Ok(output)
    }
}

type Drain = Option<thread::JoinHandle<Vec<u8>>>;

/// Read a pipe to the end on its own thread so a chatty child never blocks
/// on a full pipe buffer.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Drain) -> String {
    let bytes = handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Poll until the child exits (`Some`) or the deadline passes (`None`).
fn wait_with_deadline(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_command_is_config_error() {
        assert!(matches!(
            ToolCommand::new(&[]),
            Err(LintrendError::Config(_))
        ));
    }

    #[test]
    fn test_missing_tool() {
        let result = ToolCommand::new(&command(&["lintrend-no-such-tool-xyz"]))
            .unwrap()
            .run();
        match result {
            Err(LintrendError::ToolMissing { tool }) => {
                assert_eq!(tool, "lintrend-no-such-tool-xyz");
            }
            other => panic!("expected ToolMissing, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_output_and_status() {
        let output = ToolCommand::new(&command(&["sh", "-c"]))
            .unwrap()
            .arg("echo out; echo err >&2; exit 1")
            .run()
            .unwrap();
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert_eq!(output.status.code(), Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let started = Instant::now();
        let result = ToolCommand::new(&command(&["sleep", "5"]))
            .unwrap()
            .timeout(Duration::from_millis(200))
            .run();
        assert!(matches!(result, Err(LintrendError::Timeout { secs: 1, .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_eslint_source_parses_stdout_on_nonzero_exit() {
        let script = r#"echo '[{"filePath":"a.js","messages":[{"ruleId":"semi","severity":2,"line":1,"message":"x"}]}]'; exit 1"#;
        let source = Eslint {
            command: command(&["sh", "-c", script, "eslint"]),
            patterns: vec![],
            timeout: Duration::from_secs(10),
        };
        let files = source.lint().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].messages[0].rule_key(), "semi");
    }

    #[cfg(unix)]
    #[test]
    fn test_eslint_source_crash_is_tool_failed() {
        let source = Eslint {
            command: command(&["sh", "-c", "echo 'config broken' >&2; exit 2", "eslint"]),
            patterns: vec![],
            timeout: Duration::from_secs(10),
        };
        assert!(matches!(
            source.lint(),
            Err(LintrendError::ToolFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_prettier_source_counts_warn_lines() {
        let script = "echo 'Checking formatting...'; echo '[warn] a.js' >&2; echo '[warn] b.js' >&2; exit 1";
        let source = Prettier {
            command: command(&["sh", "-c", script, "prettier"]),
            patterns: vec![],
            timeout: Duration::from_secs(10),
        };
        assert_eq!(source.unformatted_count().unwrap(), 2);
    }
}
