use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintrendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{tool}' was not found on PATH")]
    ToolMissing { tool: String },

    #[error("'{tool}' timed out after {secs} seconds")]
    Timeout { tool: String, secs: u64 },

    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Could not parse output of '{tool}': {reason}")]
    UnparseableOutput { tool: String, reason: String },

    #[error("Rule '{0}' cannot be fixed automatically")]
    UnknownRule(String),

    #[error("Unknown theme: '{0}'")]
    UnknownTheme(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LintrendError>;
