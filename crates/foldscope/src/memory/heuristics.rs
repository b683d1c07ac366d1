//! Derived memory views over the frozen allocation/free tally.
//!
//! - Global free/alloc ratio with a coarse assessment
//! - Leak candidates: alloc > free * multiplier AND alloc - free > floor
//! - Allocation and free hotspots
//!
//! The thresholds are policy, not statistics; they come from
//! [`MemoryThresholds`].

use crate::aggregator::metrics::percentage;
use crate::aggregator::tally::{AllocFree, MemoryTally};
use crate::utils::config::MemoryThresholds;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Combined alloc/free row for one memory-family leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRow {
    pub name: String,
    pub alloc: i64,
    pub free: i64,
    pub total: i64,
    pub alloc_percentage: Option<f64>,
    pub free_percentage: Option<f64>,
    pub total_percentage: Option<f64>,
}

/// Coarse reading of the global free/alloc ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioAssessment {
    /// Far fewer frees than allocations
    PossibleLeakRisk,
    /// Far more frees than allocations
    CacheReleaseOrSamplingSkew,
    Balanced,
}

impl RatioAssessment {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::PossibleLeakRisk => {
                "Warning: frees are well below allocations, possible memory leak risk"
            }
            Self::CacheReleaseOrSamplingSkew => {
                "Note: frees exceed allocations, possibly cache release or sampling skew"
            }
            Self::Balanced => "Allocations and frees are roughly balanced",
        }
    }
}

/// Totals across every memory-family leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalRatio {
    pub total_alloc: i64,
    pub total_free: i64,
    pub alloc_percentage: Option<f64>,
    pub free_percentage: Option<f64>,

    /// free / alloc; `None` when nothing was allocated
    pub ratio: Option<f64>,

    /// `None` when nothing was allocated
    pub assessment: Option<RatioAssessment>,
}

/// A leaf whose allocations far outnumber its frees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakCandidate {
    pub name: String,
    pub alloc: i64,
    pub free: i64,

    /// alloc - free; the ranking key
    pub difference: i64,

    /// free / alloc
    pub free_rate: f64,
}

/// One entry of an allocation-only or free-only ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub rank: usize,
    pub name: String,
    pub count: i64,
    pub percentage: Option<f64>,
}

/// All memory views for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryReport {
    /// Number of distinct memory-family leaves
    pub function_count: usize,

    /// Top rows by alloc + free
    pub functions: Vec<MemoryRow>,

    pub global: GlobalRatio,

    pub leak_candidates: Vec<LeakCandidate>,

    pub alloc_hotspots: Vec<Hotspot>,

    pub free_hotspots: Vec<Hotspot>,
}

/// Heuristic engine parameterized by [`MemoryThresholds`]
#[derive(Debug, Clone)]
pub struct MemoryAnalyzer {
    thresholds: MemoryThresholds,
}

impl MemoryAnalyzer {
    pub fn new(thresholds: MemoryThresholds) -> Self {
        Self { thresholds }
    }

    /// Build every memory view
    ///
    /// **Public** - main entry point for memory analysis
    ///
    /// # Arguments
    /// * `tally` - Frozen allocation/free tally
    /// * `total_weight` - Denominator for percentages
    /// * `top_n` - Length of each ranked list
    pub fn analyze(&self, tally: &MemoryTally, total_weight: i64, top_n: usize) -> MemoryReport {
        debug!(
            "Analyzing {} memory leaves (alloc {}, free {})",
            tally.len(),
            tally.total_alloc(),
            tally.total_free()
        );

        MemoryReport {
            function_count: tally.len(),
            functions: self.function_rows(tally, total_weight, top_n),
            global: self.global_ratio(tally, total_weight),
            leak_candidates: self.leak_candidates(tally, top_n),
            alloc_hotspots: self.alloc_hotspots(tally, total_weight, top_n),
            free_hotspots: self.free_hotspots(tally, total_weight, top_n),
        }
    }

    /// Memory leaves ranked by alloc + free
    pub fn function_rows(&self, tally: &MemoryTally, total_weight: i64, top_n: usize) -> Vec<MemoryRow> {
        let mut entries: Vec<(&str, AllocFree)> =
            tally.iter().filter(|(_, counts)| counts.total() > 0).collect();
        entries.sort_by(|a, b| by_value_then_name((a.0, a.1.total()), (b.0, b.1.total())));

        entries
            .into_iter()
            .take(top_n)
            .map(|(name, counts)| MemoryRow {
                name: name.to_string(),
                alloc: counts.alloc,
                free: counts.free,
                total: counts.total(),
                alloc_percentage: percentage(counts.alloc, total_weight),
                free_percentage: percentage(counts.free, total_weight),
                total_percentage: percentage(counts.total(), total_weight),
            })
            .collect()
    }

    /// Global free/alloc ratio and its assessment
    pub fn global_ratio(&self, tally: &MemoryTally, total_weight: i64) -> GlobalRatio {
        let total_alloc = tally.total_alloc();
        let total_free = tally.total_free();

        let ratio = if total_alloc == 0 {
            None
        } else {
            Some(total_free as f64 / total_alloc as f64)
        };

        GlobalRatio {
            total_alloc,
            total_free,
            alloc_percentage: percentage(total_alloc, total_weight),
            free_percentage: percentage(total_free, total_weight),
            ratio,
            assessment: ratio.map(|r| self.assess(r)),
        }
    }

    fn assess(&self, ratio: f64) -> RatioAssessment {
        if ratio < self.thresholds.low_ratio {
            RatioAssessment::PossibleLeakRisk
        } else if ratio > self.thresholds.high_ratio {
            RatioAssessment::CacheReleaseOrSamplingSkew
        } else {
            RatioAssessment::Balanced
        }
    }

    /// Leaves with both allocations and frees whose balance is badly skewed
    ///
    /// Ranked by descending `alloc - free`.
    pub fn leak_candidates(&self, tally: &MemoryTally, top_n: usize) -> Vec<LeakCandidate> {
        let mut candidates: Vec<LeakCandidate> = tally
            .iter()
            .filter(|(_, counts)| self.is_leak_candidate(*counts))
            .map(|(name, counts)| LeakCandidate {
                name: name.to_string(),
                alloc: counts.alloc,
                free: counts.free,
                difference: counts.alloc.saturating_sub(counts.free),
                free_rate: counts.free as f64 / counts.alloc as f64,
            })
            .collect();

        candidates.sort_by(|a, b| {
            by_value_then_name((a.name.as_str(), a.difference), (b.name.as_str(), b.difference))
        });
        candidates.truncate(top_n);
        candidates
    }

    /// Both conditions are required; the absolute floor keeps low-sample
    /// leaves out
    pub fn is_leak_candidate(&self, counts: AllocFree) -> bool {
        counts.alloc > 0
            && counts.free > 0
            && counts.alloc > counts.free.saturating_mul(self.thresholds.leak_multiplier)
            && counts.alloc.saturating_sub(counts.free) > self.thresholds.leak_min_difference
    }

    /// Leaves ranked by raw allocation count
    pub fn alloc_hotspots(&self, tally: &MemoryTally, total_weight: i64, top_n: usize) -> Vec<Hotspot> {
        hotspots(tally, total_weight, top_n, |counts| counts.alloc)
    }

    /// Leaves ranked by raw free count
    pub fn free_hotspots(&self, tally: &MemoryTally, total_weight: i64, top_n: usize) -> Vec<Hotspot> {
        hotspots(tally, total_weight, top_n, |counts| counts.free)
    }
}

impl Default for MemoryAnalyzer {
    fn default() -> Self {
        Self::new(MemoryThresholds::default())
    }
}

fn hotspots<F>(tally: &MemoryTally, total_weight: i64, top_n: usize, count_of: F) -> Vec<Hotspot>
where
    F: Fn(AllocFree) -> i64,
{
    let mut entries: Vec<(&str, i64)> = tally
        .iter()
        .map(|(name, counts)| (name, count_of(counts)))
        .filter(|(_, count)| *count > 0)
        .collect();
    entries.sort_by(|a, b| by_value_then_name(*a, *b));

    entries
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(index, (name, count))| Hotspot {
            rank: index + 1,
            name: name.to_string(),
            count,
            percentage: percentage(count, total_weight),
        })
        .collect()
}

/// Descending by value, ascending by name on ties
fn by_value_then_name(a: (&str, i64), b: (&str, i64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}
