//! foldscope library
//!
//! Single-pass analysis of folded stack samples: inclusive, exclusive and
//! leaf rankings, ordered category distribution, allocation/free heuristics,
//! pattern search, high-cost outliers and a call-graph summary.
//!
//! ```ignore
//! use foldscope::aggregator::analyze_file;
//! use foldscope::report::{build_report, ReportSection, TextRenderer};
//! use foldscope::utils::config::AnalyzerConfig;
//!
//! let config = AnalyzerConfig::default();
//! let analysis = analyze_file("cpu.folded", &config)?;
//! let report = build_report(&analysis, &config, 20, &ReportSection::ALL);
//! print!("{}", TextRenderer::from_config(&config).render(&report));
//! ```

pub mod aggregator;
pub mod categorizer;
pub mod commands;
pub mod memory;
pub mod output;
pub mod parser;
pub mod report;
pub mod utils;
