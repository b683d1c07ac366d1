//! Aggregation of parsed samples into tallies and rankings.
//!
//! This module transforms folded stack lines into:
//! - Function (inclusive), exclusive and leaf tallies
//! - The caller/callee edge set
//! - Allocation/free counters for memory-family leaves
//! - Ranked, percentage-annotated views

pub mod metrics;
pub mod scan;
pub mod stack_aggregator;
pub mod tally;

// Re-export main types and functions
pub use metrics::{percentage, rank_matching, rank_tally, RankedEntry};
pub use scan::{analyze_file, analyze_reader, analyze_str, Analysis};
pub use stack_aggregator::{Aggregation, StackAggregator};
pub use tally::{AllocFree, EdgeSet, FrozenTally, MemoryTally, Tally};
