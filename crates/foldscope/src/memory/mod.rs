//! Allocation/free heuristics for memory-family leaves.
//!
//! Leaves are classified by substring: allocation-family patterns are
//! checked first, then free-family ones. The heuristics work on the frozen
//! [`MemoryTally`](crate::aggregator::MemoryTally) only.

pub mod heuristics;

pub use heuristics::{
    GlobalRatio, Hotspot, LeakCandidate, MemoryAnalyzer, MemoryReport, MemoryRow, RatioAssessment,
};

use crate::utils::config::MemoryThresholds;

/// Which counter a leaf feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryKind {
    Alloc,
    Free,
}

/// Ordered substring matcher for allocation and free leaves
#[derive(Debug, Clone)]
pub struct LeafClassifier {
    alloc_patterns: Vec<String>,
    free_patterns: Vec<String>,
}

impl LeafClassifier {
    pub fn new(alloc_patterns: Vec<String>, free_patterns: Vec<String>) -> Self {
        Self {
            alloc_patterns,
            free_patterns,
        }
    }

    pub fn from_thresholds(thresholds: &MemoryThresholds) -> Self {
        Self::new(
            thresholds.alloc_patterns.clone(),
            thresholds.free_patterns.clone(),
        )
    }

    /// Classify a leaf name; allocation wins over free
    pub fn classify(&self, leaf: &str) -> Option<MemoryKind> {
        if self.alloc_patterns.iter().any(|p| leaf.contains(p.as_str())) {
            Some(MemoryKind::Alloc)
        } else if self.free_patterns.iter().any(|p| leaf.contains(p.as_str())) {
            Some(MemoryKind::Free)
        } else {
            None
        }
    }
}

impl Default for LeafClassifier {
    fn default() -> Self {
        Self::from_thresholds(&MemoryThresholds::default())
    }
}
