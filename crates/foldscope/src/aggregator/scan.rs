//! Single-pass scan of a folded stack input.
//!
//! The input handle is opened, read line by line, and dropped before any
//! report is built. Line-level irregularities never abort the scan; only a
//! missing or unreadable input does.

use super::stack_aggregator::{Aggregation, StackAggregator};
use crate::parser::{LineParser, ParseStats, ParseWarning};
use crate::utils::config::AnalyzerConfig;
use crate::utils::error::AnalysisError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

/// Everything one scan produced, frozen for reporting
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Where the samples came from (file path or a label)
    pub source: String,

    pub parse_stats: ParseStats,

    /// Populated in strict mode only
    pub warnings: Vec<ParseWarning>,

    pub aggregation: Aggregation,
}

impl Analysis {
    /// Human-readable one-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Lines: {} seen / {} parsed | Fallbacks: {} | Rejected: {} | Samples: {} | Functions: {}",
            self.parse_stats.lines_seen,
            self.parse_stats.parsed_lines,
            self.parse_stats.fallback_lines,
            self.parse_stats.rejected_lines,
            self.aggregation.total_weight(),
            self.aggregation.function().len(),
        )
    }
}

/// Scan a folded stack file
///
/// **Public** - main entry point for file analysis
///
/// # Errors
/// * `AnalysisError::InputNotFound` - path does not exist
/// * `AnalysisError::Io` - file cannot be opened or read
/// * `AnalysisError::Config` - config fails validation
pub fn analyze_file(
    path: impl AsRef<Path>,
    config: &AnalyzerConfig,
) -> Result<Analysis, AnalysisError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AnalysisError::InputNotFound(path.display().to_string()));
    }

    info!("Parsing folded stacks: {}", path.display());
    let file = File::open(path)?;
    analyze_reader(BufReader::new(file), &path.display().to_string(), config)
}

/// Scan folded stack lines from any buffered reader
///
/// Invalid UTF-8 is replaced rather than rejected, so a damaged byte never
/// costs more than the frame it sits in.
///
/// # Errors
/// * `AnalysisError::Config` - config fails validation; nothing is read
/// * `AnalysisError::Io` - the reader fails mid-scan
pub fn analyze_reader<R: BufRead>(
    mut reader: R,
    source: &str,
    config: &AnalyzerConfig,
) -> Result<Analysis, AnalysisError> {
    config.validate()?;
    let start_time = Instant::now();

    let mut parser = LineParser::from_config(config);
    let mut aggregator = StackAggregator::from_config(config);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(sample) = parser.feed(&line) {
            aggregator.record(&sample);
        }
    }

    let (parse_stats, warnings) = parser.finish();
    let aggregation = aggregator.freeze();

    debug!(
        "Scanned {} lines into {} distinct functions, {} distinct leaves",
        parse_stats.lines_seen,
        aggregation.function().len(),
        aggregation.leaf().len()
    );

    let analysis = Analysis {
        source: source.to_string(),
        parse_stats,
        warnings,
        aggregation,
    };

    info!("{}", analysis.summary());
    info!("Parsing completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(analysis)
}

/// Scan an in-memory folded stack text
///
/// Reading from a string cannot fail.
pub fn analyze_str(input: &str, config: &AnalyzerConfig) -> Analysis {
    let mut parser = LineParser::from_config(config);
    let mut aggregator = StackAggregator::from_config(config);

    for line in input.lines() {
        if let Some(sample) = parser.feed(line) {
            aggregator.record(&sample);
        }
    }

    let (parse_stats, warnings) = parser.finish();
    Analysis {
        source: "<memory>".to_string(),
        parse_stats,
        warnings,
        aggregation: aggregator.freeze(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_and_str_agree() {
        let input = "main;run 3\nmain;run;malloc 2\n\nbroken\n";
        let config = AnalyzerConfig::default();

        let from_reader = analyze_reader(Cursor::new(input), "test", &config).unwrap();
        let from_str = analyze_str(input, &config);

        assert_eq!(from_reader.aggregation, from_str.aggregation);
        assert_eq!(from_reader.parse_stats, from_str.parse_stats);
        assert_eq!(from_reader.parse_stats.lines_seen, 4);
        assert_eq!(from_reader.aggregation.total_weight(), 6);
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let bytes: &[u8] = b"main;\xff\xfe 4\nmain;run 1\n";
        let analysis =
            analyze_reader(Cursor::new(bytes), "bytes", &AnalyzerConfig::default()).unwrap();

        assert_eq!(analysis.parse_stats.parsed_lines, 2);
        assert_eq!(analysis.aggregation.total_weight(), 5);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = analyze_file("/definitely/not/here.folded", &AnalyzerConfig::default());
        assert!(matches!(result, Err(AnalysisError::InputNotFound(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_scanning() {
        let mut config = AnalyzerConfig::default();
        config.memory.alloc_patterns.push(String::new());

        let result = analyze_reader(Cursor::new("main 1\n"), "test", &config);
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_crlf_lines() {
        let analysis = analyze_str("a;b 2\r\nc 3\r\n", &AnalyzerConfig::default());
        assert_eq!(analysis.aggregation.exclusive().get("b"), 2);
        assert_eq!(analysis.aggregation.exclusive().get("c"), 3);
    }
}
