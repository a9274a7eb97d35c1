//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Reciboclean - cleans LLM-extracted receipt line items
///
/// Takes the JSON payload produced by a vision/LLM receipt extractor,
/// repairs split name/price lines, strips leaked numbers from
/// descriptions, and drops noise lines. Outputs cleaned JSON or a
/// Markdown summary.
///
/// Examples:
///   reciboclean extraction.json
///   reciboclean extraction.json --format markdown -o report.md
///   reciboclean - < extraction.json --pretty
///   reciboclean extraction.json --dry-run
///   reciboclean --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the extraction payload JSON, or `-` for stdin
    ///
    /// Not required when using --init-config.
    #[arg(value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .reciboclean.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Placeholder description for priced items with no legible name
    ///
    /// Can also be set via RECIBOCLEAN_PLACEHOLDER or .reciboclean.toml.
    #[arg(long, value_name = "TEXT", env = "RECIBOCLEAN_PLACEHOLDER")]
    pub placeholder: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Parse and refine without writing output, print run statistics
    #[arg(long)]
    pub dry_run: bool,

    /// Fail if any cleaned item still needs a manually entered name
    ///
    /// Useful for automated pipelines. Exit code 2 when placeholder
    /// items remain.
    #[arg(long)]
    pub fail_on_manual: bool,

    /// Generate a default .reciboclean.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the cleaned payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON payload (default)
    #[default]
    Json,
    /// Markdown summary report
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the payload should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        matches!(self.input.as_deref(), Some(p) if p == std::path::Path::new("-"))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref placeholder) = self.placeholder {
            if placeholder.trim().is_empty() {
                return Err("Placeholder text must not be empty".to_string());
            }
        }

        // Validate input path when it is a real file
        if let Some(ref input) = self.input {
            if !self.reads_stdin() && !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
