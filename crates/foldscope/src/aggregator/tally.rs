//! Additive tally structures filled during the scan.
//!
//! All tallies start empty, only ever grow by addition, and can be merged
//! entry-wise. Merging tallies built from disjoint slices of the input gives
//! the same result as one pass over the whole input.
//!
//! Weights saturate at the `i64` bounds instead of overflowing.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Mutable frame name → weight accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<String, i64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to `name`, creating the entry on first sight
    pub fn add(&mut self, name: &str, weight: i64) {
        if let Some(count) = self.counts.get_mut(name) {
            *count = count.saturating_add(weight);
        } else {
            self.counts.insert(name.to_string(), weight);
        }
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: Tally) {
        for (name, weight) in other.counts {
            let count = self.counts.entry(name).or_insert(0);
            *count = count.saturating_add(weight);
        }
    }

    pub fn get(&self, name: &str) -> i64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Stop accepting additions
    pub fn freeze(self) -> FrozenTally {
        FrozenTally {
            counts: self.counts,
        }
    }
}

/// Read-only tally handed to the reporting side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrozenTally {
    counts: HashMap<String, i64>,
}

impl FrozenTally {
    pub fn get(&self, name: &str) -> i64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all entries
    pub fn sum(&self) -> i64 {
        self.counts.values().fold(0, |acc, w| acc.saturating_add(*w))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.counts.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    /// All entries, heaviest first, ties broken by name
    pub fn ranked(&self) -> Vec<(&str, i64)> {
        let mut entries: Vec<(&str, i64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// Caller → distinct callees; presence only, no weights
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: HashMap<String, HashSet<String>>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `caller` called `callee`; duplicates collapse
    pub fn insert(&mut self, caller: &str, callee: &str) {
        if !self.edges.contains_key(caller) {
            self.edges.insert(caller.to_string(), HashSet::new());
        }
        if let Some(callees) = self.edges.get_mut(caller) {
            if !callees.contains(callee) {
                callees.insert(callee.to_string());
            }
        }
    }

    pub fn merge(&mut self, other: EdgeSet) {
        for (caller, callees) in other.edges {
            self.edges.entry(caller).or_default().extend(callees);
        }
    }

    pub fn contains(&self, caller: &str, callee: &str) -> bool {
        self.edges
            .get(caller)
            .is_some_and(|callees| callees.contains(callee))
    }

    /// Number of distinct (caller, callee) pairs
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashSet::len).sum()
    }

    /// Callers ranked by number of distinct callees, ties broken by name
    pub fn callers_by_out_degree(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .edges
            .iter()
            .map(|(caller, callees)| (caller.as_str(), callees.len()))
            .collect();
        sort_by_degree(&mut entries);
        entries
    }

    /// Callees ranked by number of distinct callers, ties broken by name
    pub fn callees_by_in_degree(&self) -> Vec<(&str, usize)> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for callees in self.edges.values() {
            for callee in callees {
                *in_degree.entry(callee.as_str()).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(&str, usize)> = in_degree.into_iter().collect();
        sort_by_degree(&mut entries);
        entries
    }
}

fn sort_by_degree(entries: &mut [(&str, usize)]) {
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
}

/// Allocation and free weight recorded against one leaf
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocFree {
    pub alloc: i64,
    pub free: i64,
}

impl AllocFree {
    pub fn total(&self) -> i64 {
        self.alloc.saturating_add(self.free)
    }
}

/// Leaf name → allocation/free weights for memory-family leaves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTally {
    leaves: HashMap<String, AllocFree>,
}

impl MemoryTally {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, leaf: &str) -> &mut AllocFree {
        self.leaves.entry(leaf.to_string()).or_default()
    }

    pub fn record_alloc(&mut self, leaf: &str, weight: i64) {
        let entry = self.entry(leaf);
        entry.alloc = entry.alloc.saturating_add(weight);
    }

    pub fn record_free(&mut self, leaf: &str, weight: i64) {
        let entry = self.entry(leaf);
        entry.free = entry.free.saturating_add(weight);
    }

    pub fn merge(&mut self, other: MemoryTally) {
        for (leaf, counts) in other.leaves {
            let entry = self.leaves.entry(leaf).or_default();
            entry.alloc = entry.alloc.saturating_add(counts.alloc);
            entry.free = entry.free.saturating_add(counts.free);
        }
    }

    pub fn get(&self, leaf: &str) -> AllocFree {
        self.leaves.get(leaf).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AllocFree)> {
        self.leaves.iter().map(|(leaf, counts)| (leaf.as_str(), *counts))
    }

    pub fn total_alloc(&self) -> i64 {
        self.leaves.values().fold(0, |acc, c| acc.saturating_add(c.alloc))
    }

    pub fn total_free(&self) -> i64 {
        self.leaves.values().fold(0, |acc, c| acc.saturating_add(c.free))
    }
}
