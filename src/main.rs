//! Reciboclean - receipt extraction cleanup CLI
//!
//! Reads the JSON payload produced by an LLM/vision receipt extractor,
//! refines the candidate line items, and writes the cleaned payload or
//! a Markdown summary report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad input file, malformed JSON, config error)
//!   2 - Placeholder items remain and --fail-on-manual was set

use anyhow::{Context, Result};
use chrono::Utc;
use reciboclean::cli::{Args, OutputFormat};
use reciboclean::config::Config;
use reciboclean::ingest::RawExtraction;
use reciboclean::refine::{refine_extraction_with_stats, RefineSummary};
use reciboclean::report::{generate_json_report, generate_markdown_report, RunInfo};
use std::io::Read;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        match handle_init_config() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    init_logging(&args);

    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Refinement failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .reciboclean.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".reciboclean.toml");

    if path.exists() {
        anyhow::bail!(".reciboclean.toml already exists. Remove it first or edit it manually.");
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .reciboclean.toml")?;

    println!("Created .reciboclean.toml with default settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so cleaned JSON on stdout stays machine-readable.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the cleanup workflow. Returns the exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Read the extraction payload
    let (raw, source) = read_payload(&args)?;
    info!(
        source = %source,
        candidates = raw.section_a_items.len(),
        "Loaded extraction payload"
    );

    // Step 2: Refine
    let placeholder = config.refiner.placeholder.clone();
    let (analysis, stats) = refine_extraction_with_stats(&raw, &placeholder);
    let summary = RefineSummary::from_run(&stats, &analysis, &placeholder);
    info!(
        kept = summary.output_items,
        fused = summary.fused_items,
        dropped = summary.dropped_items,
        manual = summary.manual_name_items,
        "Refinement complete"
    );

    // Handle --dry-run: print statistics and exit
    if args.dry_run {
        println!("{}", summary.summary_text());
        return Ok(exit_code_for(&args, &summary));
    }

    // Step 3: Render the output
    let info = RunInfo {
        source,
        processed_at: Utc::now(),
    };
    let output = match args.format {
        OutputFormat::Json => generate_json_report(&analysis, config.report.pretty)?,
        OutputFormat::Markdown => generate_markdown_report(&analysis, &summary, &info, &config.report),
    };

    // Step 4: Write it
    match config.general.output {
        Some(ref path) if !path.is_empty() => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write output to {}", path))?;
            info!(path = %path, "Output written");
        }
        _ => println!("{}", output),
    }

    if summary.manual_name_items > 0 {
        warn!(
            count = summary.manual_name_items,
            "Some items kept a price but no legible name"
        );
    }

    Ok(exit_code_for(&args, &summary))
}

/// Exit code after a successful run: 2 when --fail-on-manual trips.
fn exit_code_for(args: &Args, summary: &RefineSummary) -> i32 {
    if args.fail_on_manual && summary.manual_name_items > 0 {
        error!(
            count = summary.manual_name_items,
            "Items need manual naming and --fail-on-manual is set"
        );
        2
    } else {
        0
    }
}

/// Read the payload from the input file or stdin.
fn read_payload(args: &Args) -> Result<(RawExtraction, String)> {
    if args.reads_stdin() {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read payload from stdin")?;
        let raw = RawExtraction::from_json(&buffer).context("Failed to parse stdin payload")?;
        return Ok((raw, "stdin".to_string()));
    }

    // validate() guarantees input is present past --init-config
    let path = args
        .input
        .as_deref()
        .context("No input file was provided")?;
    let raw = RawExtraction::from_file(path)?;
    Ok((raw, path.display().to_string()))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .reciboclean.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
