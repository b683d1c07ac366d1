use foldscope::aggregator::{analyze_file, analyze_str, StackAggregator};
use foldscope::categorizer::Categorizer;
use foldscope::parser::LineParser;
use foldscope::utils::config::AnalyzerConfig;
use foldscope::utils::AnalysisError;
use std::io::Write;
use tempfile::NamedTempFile;

const MIXED_INPUT: &str = "\
main;QtCore`QObject::event;QtGui`paint 40
main;QtCore`QObject::event;libsystem_malloc.dylib`malloc 12
main;AppKit`run;AppKit`run;AppKit`run 9
main;compute 25
main;compute;free 4

not a folded line
main;iiiSTEM`draw;CoreText`layout 10
";

fn aggregate_lines(lines: &[&str], config: &AnalyzerConfig) -> StackAggregator {
    let mut parser = LineParser::from_config(config);
    let mut aggregator = StackAggregator::from_config(config);
    for line in lines {
        if let Some(sample) = parser.feed(line) {
            aggregator.record(&sample);
        }
    }
    aggregator
}

#[test]
fn test_exclusive_sum_equals_total_weight() {
    let analysis = analyze_str(MIXED_INPUT, &AnalyzerConfig::default());
    let agg = &analysis.aggregation;

    // 40 + 12 + 9 + 25 + 4 + 1 (fallback) + 10
    assert_eq!(agg.total_weight(), 101);
    assert_eq!(agg.exclusive().sum(), agg.total_weight());
    assert_eq!(agg.leaf().sum(), agg.total_weight());
    assert_eq!(agg.sample_count(), 7);
}

#[test]
fn test_exclusive_category_sum_equals_total_weight() {
    let config = AnalyzerConfig::default();
    let analysis = analyze_str(MIXED_INPUT, &config);
    let categorizer = Categorizer::from_config(&config);

    let exclusive = categorizer.categorize(analysis.aggregation.exclusive());
    assert_eq!(exclusive.sum(), analysis.aggregation.total_weight());

    let inclusive = categorizer.categorize(analysis.aggregation.function());
    assert_eq!(inclusive.sum(), analysis.aggregation.function().sum());
}

#[test]
fn test_recursion_counts_every_occurrence() {
    let analysis = analyze_str("a;a;a 5\n", &AnalyzerConfig::default());
    let agg = &analysis.aggregation;

    assert_eq!(agg.function().get("a"), 15);
    assert_eq!(agg.exclusive().get("a"), 5);
    assert_eq!(agg.call_edges().edge_count(), 1);
    assert!(agg.call_edges().contains("a", "a"));
}

#[test]
fn test_memory_leaves_only() {
    let analysis = analyze_str(MIXED_INPUT, &AnalyzerConfig::default());
    let memory = analysis.aggregation.memory();

    assert_eq!(memory.len(), 2);
    assert_eq!(memory.get("libsystem_malloc.dylib`malloc").alloc, 12);
    assert_eq!(memory.get("free").free, 4);
    assert_eq!(memory.total_alloc(), 12);
    assert_eq!(memory.total_free(), 4);
}

#[test]
fn test_rerun_is_identical() {
    let config = AnalyzerConfig::default();
    let first = analyze_str(MIXED_INPUT, &config);
    let second = analyze_str(MIXED_INPUT, &config);

    assert_eq!(first.aggregation, second.aggregation);
    assert_eq!(first.parse_stats, second.parse_stats);
    assert_eq!(
        first.aggregation.function().ranked(),
        second.aggregation.function().ranked()
    );
}

#[test]
fn test_shard_merge_matches_single_pass() {
    let config = AnalyzerConfig::default();
    let lines: Vec<&str> = MIXED_INPUT.lines().collect();

    let single = aggregate_lines(&lines, &config).freeze();

    for split in 0..=lines.len() {
        let mut left = aggregate_lines(&lines[..split], &config);
        let right = aggregate_lines(&lines[split..], &config);
        left.merge(right);
        assert_eq!(left.freeze(), single, "split at line {}", split);
    }
}

#[test]
fn test_ties_rank_by_name() {
    let analysis = analyze_str("b 5\na 5\nc 7\n", &AnalyzerConfig::default());
    let ranked = analysis.aggregation.exclusive().ranked();
    assert_eq!(ranked, vec![("c", 7), ("a", 5), ("b", 5)]);
}

#[test]
fn test_empty_input() {
    let analysis = analyze_str("", &AnalyzerConfig::default());
    assert_eq!(analysis.aggregation.total_weight(), 0);
    assert!(analysis.aggregation.function().is_empty());
    assert_eq!(analysis.parse_stats.lines_seen, 0);
}

#[test]
fn test_analyze_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(MIXED_INPUT.as_bytes()).unwrap();

    let analysis = analyze_file(file.path(), &AnalyzerConfig::default()).unwrap();
    assert_eq!(analysis.aggregation.total_weight(), 101);
    assert_eq!(analysis.parse_stats.fallback_lines, 1);
    assert_eq!(analysis.parse_stats.blank_lines, 1);
    assert_eq!(analysis.source, file.path().display().to_string());
}

#[test]
fn test_analyze_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = analyze_file(dir.path().join("nope.folded"), &AnalyzerConfig::default());
    assert!(matches!(result, Err(AnalysisError::InputNotFound(_))));
}

#[test]
fn test_weights_near_i64_max_do_not_overflow() {
    let analysis = analyze_str(
        "a 9223372036854775807\nb 1\nmain;a 9223372036854775806\n",
        &AnalyzerConfig::default(),
    );
    let agg = &analysis.aggregation;

    assert_eq!(agg.total_weight(), i64::MAX);
    assert_eq!(agg.function().get("a"), i64::MAX);
    assert_eq!(agg.exclusive().get("b"), 1);
    assert_eq!(analysis.parse_stats.parsed_lines, 3);
}

#[test]
fn test_empty_frame_breaks_call_edge() {
    let analysis = analyze_str("a;;b 3\nc;d 1\n", &AnalyzerConfig::default());
    let edges = analysis.aggregation.call_edges();

    assert!(!edges.contains("a", "b"));
    assert!(edges.contains("c", "d"));
    assert_eq!(edges.edge_count(), 1);
    assert_eq!(analysis.aggregation.function().get("a"), 3);
    assert_eq!(analysis.aggregation.exclusive().get("b"), 3);
}
