//! Rankings and percentages over frozen tallies.
//!
//! Every percentage is `weight / total_weight * 100`. A zero denominator
//! yields `None` ("no data") instead of dividing.

use super::tally::FrozenTally;
use log::debug;
use serde::{Deserialize, Serialize};

/// Percentage of `total`, or `None` when there is no data
pub fn percentage(weight: i64, total: i64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some((weight as f64 / total as f64) * 100.0)
    }
}

/// One row of a ranked table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based position
    pub rank: usize,

    pub name: String,

    pub weight: i64,

    /// Share of total sample weight; `None` when the total is zero
    pub percentage: Option<f64>,
}

/// Rank a tally, heaviest first
///
/// **Public** - main entry point for the ranked views
///
/// # Arguments
/// * `tally` - Frozen tally to rank
/// * `total_weight` - Denominator for percentages
/// * `top_n` - Number of rows to keep
pub fn rank_tally(tally: &FrozenTally, total_weight: i64, top_n: usize) -> Vec<RankedEntry> {
    rank_matching(tally, total_weight, top_n, |_| true)
}

/// Rank only the entries whose name satisfies `keep`
pub fn rank_matching<F>(
    tally: &FrozenTally,
    total_weight: i64,
    top_n: usize,
    keep: F,
) -> Vec<RankedEntry>
where
    F: Fn(&str) -> bool,
{
    debug!("Ranking top {} of {} entries", top_n, tally.len());

    tally
        .ranked()
        .into_iter()
        .filter(|&(name, _)| keep(name))
        .take(top_n)
        .enumerate()
        .map(|(index, (name, weight))| create_entry(index + 1, name, weight, total_weight))
        .collect()
}

/// Build a ranked row
///
/// **Private** - internal conversion
fn create_entry(rank: usize, name: &str, weight: i64, total_weight: i64) -> RankedEntry {
    RankedEntry {
        rank,
        name: name.to_string(),
        weight,
        percentage: percentage(weight, total_weight),
    }
}
