//! foldscope CLI
//!
//! Ranked, categorized performance reports from folded stack samples.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use std::path::PathBuf;

use foldscope::commands::{
    classify_frame, display_categories, display_version, execute_analyze, AnalyzeArgs,
};
use foldscope::report::parse_sections;
use foldscope::utils::config::{load_config, AnalyzerConfig, WeightPolicy};

/// foldscope - folded stack analysis
#[derive(Parser, Debug)]
#[command(name = "foldscope")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a folded stack file and print a report
    Analyze {
        /// Folded stack file (frame1;frame2;...;frameN WEIGHT per line)
        file: PathBuf,

        /// Sections to render, comma separated: inclusive, exclusive, leaf,
        /// category, memory, pattern, performance, call, or all
        #[arg(short, long, default_value = "all")]
        analysis: String,

        /// Number of rows in each ranked table
        #[arg(short, long, default_value = "20")]
        top: usize,

        /// Write the text report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Analyzer configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report every line that needed leniency
        #[arg(long)]
        strict: bool,

        /// Handling of zero/negative weights: pass-through, reject or clamp
        #[arg(long)]
        weight_policy: Option<WeightPolicy>,

        /// Token for the pattern-search section; repeat for fallbacks
        #[arg(long = "pattern")]
        patterns: Vec<String>,
    },

    /// Show the effective category rules
    Categories {
        /// Analyzer configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the category of this frame name instead of the table
        #[arg(long)]
        classify: Option<String>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    debug!("Dispatching {:?}", cli.command);
    match cli.command {
        Commands::Analyze {
            file,
            analysis,
            top,
            output,
            json,
            config,
            strict,
            weight_policy,
            patterns,
        } => {
            let sections = parse_sections(&analysis).context("Invalid --analysis value")?;

            let args = AnalyzeArgs {
                input: file,
                sections,
                top_n: top,
                output,
                output_json: json,
                config_path: config,
                strict,
                weight_policy,
                pattern_tokens: patterns,
            };

            execute_analyze(args)?;
        }

        Commands::Categories { config, classify } => {
            let config = match config {
                Some(path) => load_config(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => AnalyzerConfig::default(),
            };

            match classify {
                Some(frame) => println!("{}", classify_frame(&config, &frame)),
                None => display_categories(&config),
            }
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
