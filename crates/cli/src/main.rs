// tabrecon - reconcile pairs of tabular datasets from a driver config

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tabrecon_cli::config::{ConfigError, DriverConfig};
use tabrecon_cli::exit_codes::{EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};
use tabrecon_cli::logging::{self, LogLevel};
use tabrecon_cli::runner::{self, PairStatus, RunOptions, RunSummary};

#[derive(Parser)]
#[command(name = "tabrecon")]
#[command(about = "Key-based reconciliation of tabular datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every pair in a driver config and write reports
    #[command(after_help = "\
Exit codes: 0 all pairs clean, 1 discrepancies found, 2 usage error,
3 invalid driver config, 4 at least one pair failed.

Examples:
  tabrecon run recon.toml
  tabrecon run recon.toml --output-dir /tmp/reports --json
  tabrecon run recon.toml --fail-fast --log-level debug --log-file recon.log")]
    Run {
        /// Path to the driver config (TOML)
        config: PathBuf,

        /// Report directory; overrides `output_dir` in the config
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Stop after the first failed pair
        #[arg(long)]
        fail_fast: bool,

        /// Log level (RUST_LOG takes precedence)
        #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
        log_level: LogLevel,

        /// Also write logs to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Parse and validate a driver config without running it
    #[command(after_help = "\
Examples:
  tabrecon validate recon.toml")]
    Validate {
        /// Path to the driver config (TOML)
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::Read { .. } => EXIT_USAGE,
            ConfigError::Parse(_) | ConfigError::Validation(_) => EXIT_INVALID_CONFIG,
        };
        Self { code, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, output_dir, json, fail_fast, log_level, log_file } => {
            cmd_run(config, output_dir, json, fail_fast, log_level, log_file)
        }
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn load_config(path: &Path) -> Result<DriverConfig, CliError> {
    if !path.is_file() {
        return Err(CliError::usage(format!("config file not found: {}", path.display()))
            .with_hint("pass the path of a driver config TOML file"));
    }
    DriverConfig::load(path).map_err(CliError::config)
}

fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(
    config_path: PathBuf,
    output_dir: Option<PathBuf>,
    json: bool,
    fail_fast: bool,
    log_level: LogLevel,
    log_file: Option<PathBuf>,
) -> Result<u8, CliError> {
    logging::init(log_level, log_file.as_deref()).map_err(|e| {
        CliError::usage(format!("cannot open log file: {e}"))
    })?;

    let config = load_config(&config_path)?;
    let options = RunOptions { output_dir, fail_fast };
    let summary = runner::run(&config, &base_dir(&config_path), &options);

    print_summary(&summary);
    if json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::usage(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    }

    Ok(summary.exit_code())
}

fn print_summary(summary: &RunSummary) {
    for pair in &summary.pairs {
        match (&pair.counts, &pair.error) {
            (_, Some(err)) => {
                eprintln!("  pair '{}': failed ({}ms) - {}", pair.name, pair.duration_ms, err);
            }
            (Some(c), None) => {
                eprintln!(
                    "  pair '{}': {} ({}ms) matched {}, mismatched {}, source only {}, target only {}",
                    pair.name,
                    pair.status.as_str(),
                    pair.duration_ms,
                    c.matched_rows,
                    c.mismatched_rows,
                    c.source_only_rows,
                    c.target_only_rows,
                );
            }
            (None, None) => eprintln!("  pair '{}': {}", pair.name, pair.status.as_str()),
        }
        for warning in &pair.mapping_warnings {
            eprintln!("    warning: {warning}");
        }
        if let Some(reports) = &pair.reports {
            eprintln!("    wrote {}", reports.html.display());
            eprintln!("    wrote {}", reports.xlsx.display());
        }
    }
    eprintln!(
        "tabrecon: {} pair(s): {} clean, {} with discrepancies, {} failed",
        summary.pairs.len(),
        summary.count(PairStatus::Clean),
        summary.count(PairStatus::Discrepancies),
        summary.count(PairStatus::Failed),
    );
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<u8, CliError> {
    let config = load_config(&config_path)?;
    for pair in &config.pairs {
        eprintln!(
            "  pair '{}': keys {} ({} -> {})",
            pair.label(),
            pair.join_key(),
            pair.source.descriptor,
            pair.target.descriptor,
        );
    }
    eprintln!("config OK: {} pair(s)", config.pairs.len());
    Ok(EXIT_SUCCESS)
}
