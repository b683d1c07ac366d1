//! Build a [`ReportData`] from a finished analysis.
//!
//! Every view is computed from the frozen tallies only; nothing here mutates
//! the analysis.

use super::schema::{
    CallGraphView, CategoryRow, CategoryView, DegreeEntry, PatternView, PerformanceView,
    ReportData, SummaryStats, WarningsView,
};
use super::sections::ReportSection;
use crate::aggregator::metrics::{percentage, rank_matching, rank_tally, RankedEntry};
use crate::aggregator::scan::Analysis;
use crate::aggregator::tally::{EdgeSet, FrozenTally};
use crate::categorizer::{CategoryTotals, Categorizer};
use crate::memory::MemoryAnalyzer;
use crate::utils::config::{AnalyzerConfig, PerformanceThresholds, SCHEMA_VERSION};
use log::debug;

/// Build the report model for the selected sections
///
/// **Public** - main entry point for report generation
///
/// # Arguments
/// * `analysis` - Finished scan
/// * `config` - Thresholds, category rules and pattern tokens
/// * `top_n` - Length of every ranked table
/// * `sections` - Sections to compute; others stay `None`
///
/// # Returns
/// Report ready for the text renderer or the JSON writer
pub fn build_report(
    analysis: &Analysis,
    config: &AnalyzerConfig,
    top_n: usize,
    sections: &[ReportSection],
) -> ReportData {
    let agg = &analysis.aggregation;
    let total = agg.total_weight();
    let wants = |section: ReportSection| sections.contains(&section);

    debug!(
        "Building report: sections [{}], top {}",
        sections
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        top_n
    );

    let stats = SummaryStats {
        lines_seen: analysis.parse_stats.lines_seen,
        parsed_lines: analysis.parse_stats.parsed_lines,
        blank_lines: analysis.parse_stats.blank_lines,
        fallback_lines: analysis.parse_stats.fallback_lines,
        rejected_lines: analysis.parse_stats.rejected_lines,
        sample_count: agg.sample_count(),
        total_weight: total,
        distinct_functions: agg.function().len(),
        distinct_leaves: agg.leaf().len(),
        call_edges: agg.call_edges().edge_count(),
    };

    ReportData {
        version: SCHEMA_VERSION.to_string(),
        source: analysis.source.clone(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        top_n,
        stats,
        inclusive: wants(ReportSection::Inclusive).then(|| rank_tally(agg.function(), total, top_n)),
        exclusive: wants(ReportSection::Exclusive)
            .then(|| rank_tally(agg.exclusive(), total, top_n)),
        leaf: wants(ReportSection::Leaf).then(|| rank_tally(agg.leaf(), total, top_n)),
        categories: wants(ReportSection::Category).then(|| {
            let categorizer = Categorizer::from_config(config);
            category_view(
                &categorizer.categorize(agg.function()),
                &categorizer.categorize(agg.exclusive()),
                total,
            )
        }),
        memory: wants(ReportSection::Memory).then(|| {
            MemoryAnalyzer::new(config.memory.clone()).analyze(agg.memory(), total, top_n)
        }),
        pattern: wants(ReportSection::Pattern)
            .then(|| pattern_view(agg.function(), total, &config.pattern_tokens, top_n)),
        performance: wants(ReportSection::Performance).then(|| {
            performance_view(agg.function(), agg.exclusive(), total, &config.performance)
        }),
        call_graph: wants(ReportSection::CallGraph)
            .then(|| call_graph_view(agg.call_edges(), top_n)),
        warnings: config.strict.then(|| WarningsView {
            total: analysis.warnings.len(),
            shown: analysis.warnings.iter().take(top_n).cloned().collect(),
        }),
    }
}

fn category_view(inclusive: &CategoryTotals, exclusive: &CategoryTotals, total: i64) -> CategoryView {
    let rows = |totals: &CategoryTotals| -> Vec<CategoryRow> {
        totals
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(index, bucket)| CategoryRow {
                rank: index + 1,
                name: bucket.name.clone(),
                weight: bucket.weight,
                frames: bucket.frames,
                percentage: percentage(bucket.weight, total),
            })
            .collect()
    };

    CategoryView {
        inclusive: rows(inclusive),
        inclusive_sum: inclusive.sum(),
        exclusive: rows(exclusive),
        exclusive_sum: exclusive.sum(),
    }
}

/// Functions containing the first token that matches anything
///
/// Later tokens are only tried when every earlier one matched nothing.
pub fn pattern_view(
    function: &FrozenTally,
    total: i64,
    tokens: &[String],
    top_n: usize,
) -> PatternView {
    for token in tokens {
        let match_count = function
            .iter()
            .filter(|(name, _)| name.contains(token.as_str()))
            .count();
        if match_count > 0 {
            debug!("Pattern '{}' matched {} functions", token, match_count);
            return PatternView {
                tokens: tokens.to_vec(),
                matched_token: Some(token.clone()),
                match_count,
                entries: rank_matching(function, total, top_n, |name| {
                    name.contains(token.as_str())
                }),
            };
        }
    }

    PatternView {
        tokens: tokens.to_vec(),
        matched_token: None,
        match_count: 0,
        entries: Vec::new(),
    }
}

/// High-cost outliers
///
/// Each ranking is truncated to `window` entries first and only then
/// filtered by percentage, so an entry ranked below the window never
/// appears even when it exceeds the threshold.
pub fn performance_view(
    function: &FrozenTally,
    exclusive: &FrozenTally,
    total: i64,
    thresholds: &PerformanceThresholds,
) -> PerformanceView {
    let above = |ranked: Vec<RankedEntry>, threshold: f64| -> Vec<RankedEntry> {
        ranked
            .into_iter()
            .filter(|entry| entry.percentage.is_some_and(|pct| pct > threshold))
            .collect()
    };

    PerformanceView {
        window: thresholds.window,
        inclusive_threshold: thresholds.inclusive_percent,
        exclusive_threshold: thresholds.exclusive_percent,
        high_inclusive: above(
            rank_tally(function, total, thresholds.window),
            thresholds.inclusive_percent,
        ),
        high_exclusive: above(
            rank_tally(exclusive, total, thresholds.window),
            thresholds.exclusive_percent,
        ),
    }
}

fn call_graph_view(edges: &EdgeSet, top_n: usize) -> CallGraphView {
    let degree_entries = |ranked: Vec<(&str, usize)>| -> Vec<DegreeEntry> {
        ranked
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(index, (name, degree))| DegreeEntry {
                rank: index + 1,
                name: name.to_string(),
                degree,
            })
            .collect()
    };

    CallGraphView {
        top_callees: degree_entries(edges.callees_by_in_degree()),
        top_callers: degree_entries(edges.callers_by_out_degree()),
    }
}
