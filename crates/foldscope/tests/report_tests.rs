use foldscope::aggregator::analyze_str;
use foldscope::report::{build_report, ReportSection, TextRenderer};
use foldscope::utils::config::{AnalyzerConfig, CategoryRule};
use pretty_assertions::assert_eq;

#[test]
fn test_text_report_layout() {
    let config = AnalyzerConfig::default();
    let analysis = analyze_str("main;run 3\nmain;idle 1\n", &config);
    let report = build_report(&analysis, &config, 20, &[ReportSection::Exclusive]);

    let rule = "=".repeat(80);
    let expected = [
        rule.as_str(),
        "Folded stack analysis report",
        rule.as_str(),
        "File: <memory>",
        "Total samples: 4",
        "Distinct functions: 3",
        "Distinct leaves: 2",
        "Call edges: 2",
        "Lines: 2 seen / 2 parsed (blank 0, fallback 0, rejected 0)",
        "",
        rule.as_str(),
        "Exclusive weight ranking (leaf frames only)",
        rule.as_str(),
        "  1. run               3 ( 75.00%)",
        "  2. idle              1 ( 25.00%)",
        "",
    ]
    .join("\n")
        + "\n";

    assert_eq!(TextRenderer::new(10, 10).render(&report), expected);
}

#[test]
fn test_zero_samples_render_no_data() {
    let config = AnalyzerConfig::default();
    let analysis = analyze_str("\n\n", &config);
    let report = build_report(&analysis, &config, 20, &ReportSection::ALL);
    let text = TextRenderer::from_config(&config).render(&report);

    assert_eq!(report.stats.total_weight, 0);
    assert!(text.contains("Total samples: 0"));
    assert!(text.contains("(no data)"));
    assert!(text.contains("Free/alloc ratio: no data"));
    assert!(!text.contains("%)\n"));
}

#[test]
fn test_zero_total_weight_with_samples() {
    let config = AnalyzerConfig::default();
    let analysis = analyze_str("main;run 0\n", &config);
    let report = build_report(&analysis, &config, 20, &[ReportSection::Inclusive]);

    let inclusive = report.inclusive.unwrap();
    assert_eq!(inclusive.len(), 2);
    assert!(inclusive.iter().all(|e| e.percentage.is_none()));
}

#[test]
fn test_performance_window_excludes_rank_21() {
    let input: String = (0..21)
        .map(|i| format!("f{:02} {}\n", i, 100 - i))
        .collect();
    let config = AnalyzerConfig::default();
    let analysis = analyze_str(&input, &config);
    let report = build_report(&analysis, &config, 50, &[ReportSection::Performance]);

    let perf = report.performance.unwrap();
    assert_eq!(perf.window, 20);
    assert_eq!(perf.high_inclusive.len(), 20);
    assert!(perf.high_inclusive.iter().all(|e| e.name != "f20"));
    assert_eq!(perf.high_exclusive.len(), 20);

    // f20 is above the threshold on its own
    let f20 = analysis.aggregation.function().get("f20") as f64
        / analysis.aggregation.total_weight() as f64
        * 100.0;
    assert!(f20 > perf.inclusive_threshold);
}

#[test]
fn test_performance_thresholds_are_strict() {
    let config = AnalyzerConfig::default();
    // exactly 2% inclusive for "edge"
    let analysis = analyze_str("edge 2\nbulk 98\n", &config);
    let report = build_report(&analysis, &config, 20, &[ReportSection::Performance]);

    let perf = report.performance.unwrap();
    let inclusive: Vec<&str> = perf.high_inclusive.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(inclusive, vec!["bulk"]);
    let exclusive: Vec<&str> = perf.high_exclusive.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(exclusive, vec!["bulk", "edge"]);
}

#[test]
fn test_pattern_section_fallback() {
    let config = AnalyzerConfig::default();
    let analysis = analyze_str("main;iiiSTEM`draw 3\nmain;other 1\n", &config);
    let report = build_report(&analysis, &config, 20, &[ReportSection::Pattern]);

    let pattern = report.pattern.unwrap();
    assert_eq!(pattern.matched_token.as_deref(), Some("iiiSTEM"));
    assert_eq!(pattern.entries.len(), 1);

    let text = TextRenderer::from_config(&config).render(&build_report(
        &analysis,
        &config,
        20,
        &[ReportSection::Pattern],
    ));
    assert!(text.contains("Functions containing 'iiiSTEM': 1"));
}

#[test]
fn test_category_priority_is_stable() {
    let mut config = AnalyzerConfig::default();
    config.categories = vec![
        CategoryRule::new("cocoa", "libqcocoa"),
        CategoryRule::new("qt", "Qt"),
    ];
    let input = "main;libqcocoa.dylib`QtCocoaView 5\nmain;QtCore`tick 3\n";

    for _ in 0..3 {
        let analysis = analyze_str(input, &config);
        let report = build_report(&analysis, &config, 20, &[ReportSection::Category]);
        let categories = report.categories.unwrap();

        let exclusive: Vec<(&str, i64)> = categories
            .exclusive
            .iter()
            .map(|row| (row.name.as_str(), row.weight))
            .collect();
        assert_eq!(exclusive, vec![("cocoa", 5), ("qt", 3)]);
        assert_eq!(categories.exclusive_sum, 8);
        // "main" lands in the fallback bucket on the inclusive side
        assert_eq!(categories.inclusive_sum, 16);
        assert_eq!(categories.inclusive[0].name, "other");
    }
}

#[test]
fn test_strict_mode_adds_warnings_section() {
    let mut config = AnalyzerConfig::default();
    config.strict = true;
    let analysis = analyze_str("main;run 3\nbroken line\n", &config);
    let report = build_report(&analysis, &config, 20, &[ReportSection::Leaf]);

    let warnings = report.warnings.clone().unwrap();
    assert_eq!(warnings.total, 1);
    assert_eq!(warnings.shown[0].line_number, 2);

    let text = TextRenderer::from_config(&config).render(&report);
    assert!(text.contains("Parse warnings"));
    assert!(text.contains("line 2: no trailing weight, defaulted to 1 (broken line)"));
}

#[test]
fn test_memory_section_text() {
    let config = AnalyzerConfig::default();
    let analysis = analyze_str(
        "main;malloc 100\nmain;malloc;x 1\nmain;free 1\nmain;work 98\n",
        &config,
    );
    let report = build_report(&analysis, &config, 20, &[ReportSection::Memory]);
    let memory = report.memory.clone().unwrap();

    assert_eq!(memory.global.total_alloc, 100);
    assert_eq!(memory.global.total_free, 1);
    assert!(memory.leak_candidates.is_empty());

    let text = TextRenderer::from_config(&config).render(&report);
    assert!(text.contains("Free/alloc ratio: 0.010"));
    assert!(text.contains("possible memory leak risk"));
    assert!(text.contains("(no unbalanced alloc/free functions found)"));
}

#[test]
fn test_call_graph_section() {
    let config = AnalyzerConfig::default();
    let analysis = analyze_str("main;a;x 1\nmain;b;x 1\nmain;b;y 1\n", &config);
    let report = build_report(&analysis, &config, 1, &[ReportSection::CallGraph]);
    let graph = report.call_graph.unwrap();

    assert_eq!(graph.top_callees.len(), 1);
    assert_eq!(graph.top_callees[0].name, "x");
    assert_eq!(graph.top_callees[0].degree, 2);
    assert_eq!(graph.top_callers[0].name, "b");
    assert_eq!(graph.top_callers[0].degree, 2);
}
