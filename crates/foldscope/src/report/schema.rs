//! Report schema definitions.
//!
//! [`ReportData`] is the frozen, render-ready summary of one analysis. The
//! text renderer and the JSON writer both consume it, so the two outputs
//! never disagree. The schema is versioned to allow future evolution.

use crate::aggregator::metrics::RankedEntry;
use crate::memory::MemoryReport;
use crate::parser::ParseWarning;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// Schema version for compatibility checking
    pub version: String,

    /// Input file that was analyzed
    pub source: String,

    /// RFC 3339 timestamp when the report was generated
    pub generated_at: String,

    /// Length limit applied to every ranked table
    pub top_n: usize,

    pub stats: SummaryStats,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusive: Option<Vec<RankedEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive: Option<Vec<RankedEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<Vec<RankedEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryView>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternView>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceView>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_graph: Option<CallGraphView>,

    /// Present in strict mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<WarningsView>,
}

/// Scan-wide counters shown in the report header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub lines_seen: usize,
    pub parsed_lines: usize,
    pub blank_lines: usize,
    pub fallback_lines: usize,
    pub rejected_lines: usize,

    /// Accepted samples (one per parsed line)
    pub sample_count: usize,

    /// Sum of all accepted weights; every percentage is relative to this
    pub total_weight: i64,

    pub distinct_functions: usize,
    pub distinct_leaves: usize,
    pub call_edges: usize,
}

/// One category bucket in a distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub rank: usize,
    pub name: String,
    pub weight: i64,

    /// Distinct frames assigned to the bucket
    pub frames: usize,

    pub percentage: Option<f64>,
}

/// Category distribution over the inclusive and exclusive tallies
///
/// Only the exclusive column sums to the total weight; the inclusive column
/// counts a frame once per stack position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryView {
    pub inclusive: Vec<CategoryRow>,
    pub inclusive_sum: i64,
    pub exclusive: Vec<CategoryRow>,
    pub exclusive_sum: i64,
}

/// Functions whose name contains a configured token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternView {
    /// Tokens tried, in order
    pub tokens: Vec<String>,

    /// First token with at least one match; `None` when nothing matched
    pub matched_token: Option<String>,

    /// Number of matching functions before truncation
    pub match_count: usize,

    /// Top matches by inclusive weight
    pub entries: Vec<RankedEntry>,
}

/// High-cost outliers within the top-ranked window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceView {
    pub window: usize,
    pub inclusive_threshold: f64,
    pub exclusive_threshold: f64,
    pub high_inclusive: Vec<RankedEntry>,
    pub high_exclusive: Vec<RankedEntry>,
}

/// A function and how many distinct neighbours it has
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeEntry {
    pub rank: usize,
    pub name: String,
    pub degree: usize,
}

/// Call-graph summary by edge membership, not weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraphView {
    /// Functions called from the most distinct callers
    pub top_callees: Vec<DegreeEntry>,

    /// Functions calling the most distinct callees
    pub top_callers: Vec<DegreeEntry>,
}

/// Strict-mode parse warnings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningsView {
    /// Every warning recorded, before truncation
    pub total: usize,

    pub shown: Vec<ParseWarning>,
}
