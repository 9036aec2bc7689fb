use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lintrend::cli;
use lintrend::config::{Config, Overrides};
use lintrend::runner::FormatSource;
use lintrend::theme::{Theme, DEFAULT_THEME};
use lintrend::track::TrackOptions;

/// Record lint and formatting issue counts over time and chart the trend.
#[derive(Parser)]
#[command(name = "lintrend", version, about)]
struct Cli {
    /// Config file (default: ./lintrend.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the progress log and reports.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Abort external tools after this many milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    timeout: Option<u64>,

    /// Verbose diagnostics on stderr.
    #[arg(long, global = true, conflicts_with = "quiet")]
    debug: bool,

    /// Only report errors on stderr.
    #[arg(long, global = true)]
    quiet: bool,

    /// Disable coloured output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Never prompt. Every command already runs without prompting.
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the linter (and formatter check), then record the result.
    Track {
        /// Skip the formatting check.
        #[arg(long)]
        no_formatting: bool,

        /// Don't write the top-rules block under the log entry.
        #[arg(long)]
        no_details: bool,
    },

    /// Show the progress chart and trend analysis.
    Chart {
        /// Print the history and analysis as JSON (also saved to trend.json).
        #[arg(long)]
        json: bool,
    },

    /// Compare the two most recent runs.
    Compare,

    /// Apply the linter's autofix for a single rule.
    Fix {
        /// Rule id, e.g. "no-unused-vars".
        rule: String,

        /// Only report what would be fixed.
        #[arg(long)]
        dry_run: bool,
    },

    /// List colour themes, or select one.
    Theme {
        /// Theme to select.
        name: Option<String>,

        /// List available themes.
        #[arg(long, conflicts_with = "name")]
        list: bool,
    },

    /// Write an HTML report to the output directory.
    Html,
}

fn init_logging(debug: bool, quiet: bool) {
    let default_level = if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Persisted selection first, then the config file, then the default.
fn resolve_theme(cli: &Cli, config: &Config) -> Result<Theme> {
    if cli.no_color {
        return Ok(Theme::plain());
    }
    let persisted = config.store().read_theme().context("Failed to read theme selection")?;
    let name = persisted
        .or_else(|| config.theme.clone())
        .unwrap_or_else(|| DEFAULT_THEME.to_string());
    match Theme::by_name(&name) {
        Ok(theme) => Ok(theme),
        Err(e) => {
            tracing::warn!("{e}, using the default theme");
            Ok(Theme::default())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.quiet);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let (check_formatting, include_details) = match cli.command {
        Commands::Track {
            no_formatting,
            no_details,
        } => (no_formatting.then_some(false), no_details.then_some(false)),
        _ => (None, None),
    };
    let overrides = Overrides {
        output_dir: cli.output_dir.clone(),
        timeout_ms: cli.timeout,
        check_formatting,
        include_details,
    };
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config = Config::load(cli.config.as_deref(), &cwd, &overrides).context("Failed to load configuration")?;
    tracing::debug!(?config, non_interactive = cli.non_interactive, "resolved configuration");

    let theme = resolve_theme(&cli, &config)?;
    let store = config.store();
    let now = chrono::Utc::now();
    let today = chrono::Local::now().date_naive();

    let output = match &cli.command {
        Commands::Track { .. } => {
            let eslint = config.eslint();
            let prettier = config.prettier();
            let format: Option<&dyn FormatSource> = config.check_formatting.then_some(&prettier as &dyn FormatSource);
            let options = TrackOptions {
                include_details: config.include_details,
                top_issues: config.top_issues,
                patterns: config.patterns.clone(),
                root: Some(cwd.clone()),
            };
            cli::cmd_track(&eslint, format, &store, &options, &theme, &now.to_rfc3339())?
        }
        Commands::Chart { json } => cli::cmd_chart(&store, &theme, *json, today)?,
        Commands::Compare => cli::cmd_compare(&store, &theme)?,
        Commands::Fix { rule, dry_run } => {
            let eslint = config.eslint();
            cli::cmd_fix(&eslint, &eslint, rule, *dry_run, &theme)?
        }
        Commands::Theme { name, list } => {
            let name = if *list { None } else { name.as_deref() };
            cli::cmd_theme(&store, name, &theme)?
        }
        Commands::Html => cli::cmd_html(&store, &now.to_rfc3339(), today)?,
    };

    print!("{output}");
    Ok(())
}
