//! Plain-text rendering of a [`ReportData`].
//!
//! One self-titled section per computed view, each ranked row formatted as
//! `rank. name weight (percentage%)` with the name truncated to a fixed
//! display width. The output carries no terminal colors so it can be written
//! to a file verbatim.

use super::schema::{
    CallGraphView, CategoryRow, CategoryView, DegreeEntry, PatternView, PerformanceView,
    ReportData, WarningsView,
};
use crate::aggregator::metrics::RankedEntry;
use crate::memory::{Hotspot, MemoryReport};
use crate::utils::config::{AnalyzerConfig, DEFAULT_DISPLAY_WIDTH, DEFAULT_LEAF_DISPLAY_WIDTH};

const RULE_WIDTH: usize = 80;
const CATEGORY_NAME_WIDTH: usize = 20;
const NO_DATA: &str = "(no data)";

/// Text renderer with fixed name display widths
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    width: usize,
    leaf_width: usize,
}

impl TextRenderer {
    pub fn new(width: usize, leaf_width: usize) -> Self {
        Self { width, leaf_width }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.display_width, config.leaf_display_width)
    }

    /// Render every section present in `report`, header first
    pub fn render(&self, report: &ReportData) -> String {
        let mut out = String::new();

        out.push_str(&self.render_header(report));

        if let Some(entries) = &report.inclusive {
            out.push_str(&section_title("Inclusive weight ranking (frame and its callees)"));
            out.push_str(&self.ranked_rows(entries, self.width));
            out.push('\n');
        }
        if let Some(entries) = &report.exclusive {
            out.push_str(&section_title("Exclusive weight ranking (leaf frames only)"));
            out.push_str(&self.ranked_rows(entries, self.width));
            out.push('\n');
        }
        if let Some(entries) = &report.leaf {
            out.push_str(&section_title("Leaf function ranking"));
            out.push_str(&self.ranked_rows(entries, self.leaf_width));
            out.push('\n');
        }
        if let Some(view) = &report.categories {
            out.push_str(&self.render_categories(view));
        }
        if let Some(memory) = &report.memory {
            out.push_str(&self.render_memory(memory));
        }
        if let Some(view) = &report.pattern {
            out.push_str(&self.render_pattern(view));
        }
        if let Some(view) = &report.performance {
            out.push_str(&self.render_performance(view));
        }
        if let Some(view) = &report.call_graph {
            out.push_str(&self.render_call_graph(view));
        }
        if let Some(view) = &report.warnings {
            out.push_str(&render_warnings(view));
        }

        out
    }

    fn render_header(&self, report: &ReportData) -> String {
        let stats = &report.stats;
        let mut out = section_title("Folded stack analysis report");
        out.push_str(&format!("File: {}\n", report.source));
        out.push_str(&format!("Total samples: {}\n", stats.total_weight));
        out.push_str(&format!("Distinct functions: {}\n", stats.distinct_functions));
        out.push_str(&format!("Distinct leaves: {}\n", stats.distinct_leaves));
        out.push_str(&format!("Call edges: {}\n", stats.call_edges));
        out.push_str(&format!(
            "Lines: {} seen / {} parsed (blank {}, fallback {}, rejected {})\n",
            stats.lines_seen,
            stats.parsed_lines,
            stats.blank_lines,
            stats.fallback_lines,
            stats.rejected_lines
        ));
        out.push('\n');
        out
    }

    fn ranked_rows(&self, entries: &[RankedEntry], width: usize) -> String {
        if entries.is_empty() {
            return format!("  {}\n", NO_DATA);
        }

        entries
            .iter()
            .map(|entry| {
                format!(
                    "{:>3}. {:<width$} {:>8} {}\n",
                    entry.rank,
                    truncate(&entry.name, width),
                    entry.weight,
                    format_percentage(entry.percentage),
                    width = width
                )
            })
            .collect()
    }

    fn render_categories(&self, view: &CategoryView) -> String {
        let mut out = section_title("Category distribution");

        out.push_str("Inclusive (every stack position):\n");
        out.push_str(&category_rows(&view.inclusive));
        out.push_str(&format!(
            "  {:<width$} {:>8}\n",
            "sum",
            view.inclusive_sum,
            width = CATEGORY_NAME_WIDTH
        ));
        out.push('\n');

        out.push_str("Exclusive (leaf frames only):\n");
        out.push_str(&category_rows(&view.exclusive));
        out.push_str(&format!(
            "  {:<width$} {:>8}\n",
            "sum",
            view.exclusive_sum,
            width = CATEGORY_NAME_WIDTH
        ));
        out.push('\n');

        out
    }

    fn render_memory(&self, memory: &MemoryReport) -> String {
        let width = self.width;
        let mut out = section_title("Memory allocation analysis");

        out.push_str(&format!("Memory-family functions: {}\n\n", memory.function_count));

        out.push_str("Per-function allocations / frees / total:\n");
        if memory.functions.is_empty() {
            out.push_str(&format!("  {}\n", NO_DATA));
        }
        for (index, row) in memory.functions.iter().enumerate() {
            out.push_str(&format!(
                "{:>3}. {:<width$} alloc:{:>6} {} free:{:>6} {} total:{:>6} {}\n",
                index + 1,
                truncate(&row.name, width),
                row.alloc,
                format_percentage(row.alloc_percentage),
                row.free,
                format_percentage(row.free_percentage),
                row.total,
                format_percentage(row.total_percentage),
                width = width
            ));
        }

        let global = &memory.global;
        out.push('\n');
        out.push_str(&format!(
            "Total allocations: {} {}\n",
            global.total_alloc,
            format_percentage(global.alloc_percentage)
        ));
        out.push_str(&format!(
            "Total frees: {} {}\n",
            global.total_free,
            format_percentage(global.free_percentage)
        ));
        match global.ratio {
            Some(ratio) => out.push_str(&format!("Free/alloc ratio: {:.3}\n", ratio)),
            None => out.push_str("Free/alloc ratio: no data\n"),
        }
        if let Some(assessment) = global.assessment {
            out.push_str(assessment.describe());
            out.push('\n');
        }

        out.push_str("\nLeak candidates (allocations far above frees):\n");
        if memory.leak_candidates.is_empty() {
            out.push_str("  (no unbalanced alloc/free functions found)\n");
        }
        for (index, leak) in memory.leak_candidates.iter().enumerate() {
            out.push_str(&format!(
                "{:>3}. {:<width$} alloc:{:>6} free:{:>6} diff:{:>6} free rate:{:.2}\n",
                index + 1,
                truncate(&leak.name, width),
                leak.alloc,
                leak.free,
                leak.difference,
                leak.free_rate,
                width = width
            ));
        }

        out.push_str("\nAllocation hotspots:\n");
        out.push_str(&hotspot_rows(&memory.alloc_hotspots, width));

        out.push_str("\nFree hotspots:\n");
        out.push_str(&hotspot_rows(&memory.free_hotspots, width));

        out.push('\n');
        out
    }

    fn render_pattern(&self, view: &PatternView) -> String {
        let mut out = section_title("Pattern search");

        match &view.matched_token {
            Some(token) => {
                out.push_str(&format!(
                    "Functions containing '{}': {}\n",
                    token, view.match_count
                ));
                out.push_str(&self.ranked_rows(&view.entries, self.width));
            }
            None => out.push_str(&format!(
                "No functions containing any of: {}\n",
                view.tokens.join(", ")
            )),
        }

        out.push('\n');
        out
    }

    fn render_performance(&self, view: &PerformanceView) -> String {
        let mut out = section_title("Potential performance issues");

        out.push_str(&format!(
            "High inclusive weight (top {}, above {:.2}%):\n",
            view.window, view.inclusive_threshold
        ));
        out.push_str(&self.outlier_rows(&view.high_inclusive));
        out.push('\n');

        out.push_str(&format!(
            "High exclusive weight (top {}, above {:.2}%):\n",
            view.window, view.exclusive_threshold
        ));
        out.push_str(&self.outlier_rows(&view.high_exclusive));
        out.push('\n');

        out
    }

    fn outlier_rows(&self, entries: &[RankedEntry]) -> String {
        if entries.is_empty() {
            return "  (none)\n".to_string();
        }
        entries
            .iter()
            .map(|entry| {
                format!(
                    "  {:<width$} {}\n",
                    truncate(&entry.name, self.width),
                    format_percentage(entry.percentage),
                    width = self.width
                )
            })
            .collect()
    }

    fn render_call_graph(&self, view: &CallGraphView) -> String {
        let mut out = section_title("Call relationships");

        out.push_str("Most called functions (distinct callers):\n");
        out.push_str(&self.degree_rows(&view.top_callees, "called by"));
        out.push('\n');

        out.push_str("Functions calling the most others (distinct callees):\n");
        out.push_str(&self.degree_rows(&view.top_callers, "calls"));
        out.push('\n');

        out
    }

    fn degree_rows(&self, entries: &[DegreeEntry], verb: &str) -> String {
        if entries.is_empty() {
            return format!("  {}\n", NO_DATA);
        }
        entries
            .iter()
            .map(|entry| {
                format!(
                    "{:>3}. {:<width$} {} {:>3} distinct functions\n",
                    entry.rank,
                    truncate(&entry.name, self.width),
                    verb,
                    entry.degree,
                    width = self.width
                )
            })
            .collect()
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_WIDTH, DEFAULT_LEAF_DISPLAY_WIDTH)
    }
}

fn section_title(title: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{}\n{}\n{}\n", rule, title, rule)
}

fn category_rows(rows: &[CategoryRow]) -> String {
    if rows.is_empty() {
        return format!("  {}\n", NO_DATA);
    }
    rows.iter()
        .map(|row| {
            format!(
                "  {:<width$} {:>8} {}\n",
                truncate(&row.name, CATEGORY_NAME_WIDTH),
                row.weight,
                format_percentage(row.percentage),
                width = CATEGORY_NAME_WIDTH
            )
        })
        .collect()
}

fn hotspot_rows(hotspots: &[Hotspot], width: usize) -> String {
    if hotspots.is_empty() {
        return format!("  {}\n", NO_DATA);
    }
    hotspots
        .iter()
        .map(|spot| {
            format!(
                "{:>3}. {:<width$} {:>8} {}\n",
                spot.rank,
                truncate(&spot.name, width),
                spot.count,
                format_percentage(spot.percentage),
                width = width
            )
        })
        .collect()
}

fn render_warnings(view: &WarningsView) -> String {
    let mut out = section_title("Parse warnings");
    out.push_str(&format!(
        "{} irregular lines (showing {})\n",
        view.total,
        view.shown.len()
    ));
    for warning in &view.shown {
        out.push_str(&format!("  {}\n", warning));
    }
    out.push('\n');
    out
}

/// `( 12.34%)`, or `(no data)` when the total was zero
pub fn format_percentage(percentage: Option<f64>) -> String {
    match percentage {
        Some(pct) => format!("({:>6.2}%)", pct),
        None => NO_DATA.to_string(),
    }
}

/// First `width` characters of `name`
fn truncate(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}
