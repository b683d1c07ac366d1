use crate::report::ReportSection;
use crate::utils::config::{WeightPolicy, DEFAULT_TOP_N};
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Folded stack file to analyze
    pub input: PathBuf,

    /// Report sections to render, in rendering order
    pub sections: Vec<ReportSection>,

    /// Length of every ranked table
    pub top_n: usize,

    /// Write the text report here instead of stdout
    pub output: Option<PathBuf>,

    /// Also write the report as JSON
    pub output_json: Option<PathBuf>,

    /// Analyzer configuration file (TOML)
    pub config_path: Option<PathBuf>,

    /// Surface a warning per irregular line
    pub strict: bool,

    /// Overrides the configured weight policy
    pub weight_policy: Option<WeightPolicy>,

    /// Overrides the configured pattern-search tokens when non-empty
    pub pattern_tokens: Vec<String>,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            sections: ReportSection::ALL.to_vec(),
            top_n: DEFAULT_TOP_N,
            output: None,
            output_json: None,
            config_path: None,
            strict: false,
            weight_policy: None,
            pattern_tokens: Vec::new(),
        }
    }
}
