//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Resolves the analyzer configuration (file, then CLI overrides)
//! 2. Scans the folded stack file in a single pass
//! 3. Builds the selected report sections
//! 4. Writes the text report (stdout or file) and the optional JSON report

use crate::aggregator::{analyze_file, Analysis};
use crate::commands::models::AnalyzeArgs;
use crate::output::{write_report, write_report_text};
use crate::report::{build_report, ReportData, TextRenderer};
use crate::utils::config::{load_config, AnalyzerConfig, MAX_TOP_N};
use anyhow::{Context, Result};
use colored::*;
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// The report that was rendered, so callers can inspect it
///
/// # Errors
/// * Invalid arguments or configuration
/// * Missing or unreadable input file
/// * Output write failures
///
/// # Example
/// ```ignore
/// let args = AnalyzeArgs {
///     input: PathBuf::from("cpu.folded"),
///     sections: parse_sections("inclusive,memory")?,
///     ..Default::default()
/// };
///
/// execute_analyze(args)?;
/// ```
pub fn execute_analyze(args: AnalyzeArgs) -> Result<ReportData> {
    let start_time = Instant::now();

    validate_args(&args)?;

    let config = resolve_config(&args)?;

    info!("Analyzing folded stacks: {}", args.input.display());
    let analysis = analyze_file(&args.input, &config)
        .with_context(|| format!("Failed to analyze {}", args.input.display()))?;

    report_leniency(&analysis);

    let report = build_report(&analysis, &config, args.top_n, &args.sections);
    let text = TextRenderer::from_config(&config).render(&report);

    match &args.output {
        Some(path) => {
            write_report_text(&text, path).context("Failed to write text report")?;
            eprintln!(
                "{} Report written to {}",
                "✓".green(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{}", text),
    }

    if let Some(path) = &args.output_json {
        write_report(&report, path).context("Failed to write JSON report")?;
        eprintln!(
            "{} JSON report written to {}",
            "✓".green(),
            path.display().to_string().cyan()
        );
    }

    info!(
        "Lines seen: {} / parsed: {}",
        analysis.parse_stats.lines_seen, analysis.parse_stats.parsed_lines
    );
    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Load the configuration file, if any, then apply CLI overrides
///
/// # Errors
/// * Config file cannot be read or parsed
/// * Resulting configuration is inconsistent
pub fn resolve_config(args: &AnalyzeArgs) -> Result<AnalyzerConfig> {
    let mut config = match &args.config_path {
        Some(path) => {
            debug!("Loading analyzer config from {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => AnalyzerConfig::default(),
    };

    if args.strict {
        config.strict = true;
    }
    if let Some(policy) = args.weight_policy {
        config.weight_policy = policy;
    }
    if !args.pattern_tokens.is_empty() {
        config.pattern_tokens = args.pattern_tokens.clone();
    }

    config
        .validate()
        .context("Invalid analyzer configuration")?;

    Ok(config)
}

/// Make lenient parsing visible on the terminal
///
/// **Private** - internal helper for execute_analyze
fn report_leniency(analysis: &Analysis) {
    let stats = &analysis.parse_stats;
    if stats.irregular_lines() == 0 {
        return;
    }

    warn!(
        "{} of {} non-blank lines needed leniency ({} defaulted to weight 1, {} rejected)",
        stats.irregular_lines(),
        stats.lines_seen - stats.blank_lines,
        stats.fallback_lines,
        stats.rejected_lines
    );
    if analysis.warnings.is_empty() {
        eprintln!(
            "{} {} irregular lines; rerun with --strict to list them",
            "!".yellow().bold(),
            stats.irregular_lines()
        );
    }
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input file path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if args.sections.is_empty() {
        anyhow::bail!("At least one analysis section must be selected");
    }

    if args.top_n == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top_n > MAX_TOP_N {
        anyhow::bail!("top is too large (max {})", MAX_TOP_N);
    }

    if args.pattern_tokens.iter().any(|t| t.is_empty()) {
        anyhow::bail!("Pattern tokens cannot be empty");
    }

    Ok(())
}
