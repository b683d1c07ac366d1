//! Fold parsed samples into tallies.
//!
//! For a sample with stack S (root→leaf) and weight w:
//! - every position of S adds w to the function tally (recursion counts
//!   once per occurrence)
//! - every adjacent (caller, callee) pair is recorded in the edge set
//! - the leaf adds w to the exclusive and leaf tallies
//! - a memory-family leaf adds w to its allocation or free counter
//!
//! Example: "main;run;run 5" gives function[run] = 10, exclusive[run] = 5,
//! edges {main→run, run→run}.

use super::tally::{EdgeSet, FrozenTally, MemoryTally, Tally};
use crate::memory::{LeafClassifier, MemoryKind};
use crate::parser::Sample;
use crate::utils::config::AnalyzerConfig;

/// Mutable accumulator for one analysis run
#[derive(Debug, Clone)]
pub struct StackAggregator {
    function: Tally,
    exclusive: Tally,
    leaf: Tally,
    edges: EdgeSet,
    memory: MemoryTally,
    classifier: LeafClassifier,
    sample_count: usize,
    total_weight: i64,
}

impl StackAggregator {
    pub fn new(classifier: LeafClassifier) -> Self {
        Self {
            function: Tally::new(),
            exclusive: Tally::new(),
            leaf: Tally::new(),
            edges: EdgeSet::new(),
            memory: MemoryTally::new(),
            classifier,
            sample_count: 0,
            total_weight: 0,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(LeafClassifier::from_thresholds(&config.memory))
    }

    /// Add one sample to every tally in O(stack length)
    pub fn record(&mut self, sample: &Sample<'_>) {
        let Some(leaf) = sample.leaf() else {
            return;
        };
        let weight = sample.weight;

        for frame in &sample.frames {
            self.function.add(frame, weight);
        }

        for (caller, callee) in sample.calls() {
            self.edges.insert(caller, callee);
        }

        self.exclusive.add(leaf, weight);
        self.leaf.add(leaf, weight);

        match self.classifier.classify(leaf) {
            Some(MemoryKind::Alloc) => self.memory.record_alloc(leaf, weight),
            Some(MemoryKind::Free) => self.memory.record_free(leaf, weight),
            None => {}
        }

        self.sample_count += 1;
        self.total_weight = self.total_weight.saturating_add(weight);
    }

    /// Fold a partial aggregation (built from another slice of the input)
    /// into this one
    pub fn merge(&mut self, other: StackAggregator) {
        self.function.merge(other.function);
        self.exclusive.merge(other.exclusive);
        self.leaf.merge(other.leaf);
        self.edges.merge(other.edges);
        self.memory.merge(other.memory);
        self.sample_count += other.sample_count;
        self.total_weight = self.total_weight.saturating_add(other.total_weight);
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn total_weight(&self) -> i64 {
        self.total_weight
    }

    /// End the scan; the result only hands out shared references
    pub fn freeze(self) -> Aggregation {
        Aggregation {
            function: self.function.freeze(),
            exclusive: self.exclusive.freeze(),
            leaf: self.leaf.freeze(),
            edges: self.edges,
            memory: self.memory,
            sample_count: self.sample_count,
            total_weight: self.total_weight,
        }
    }
}

/// Frozen tallies of a finished scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    function: FrozenTally,
    exclusive: FrozenTally,
    leaf: FrozenTally,
    edges: EdgeSet,
    memory: MemoryTally,
    sample_count: usize,
    total_weight: i64,
}

impl Aggregation {
    /// Inclusive weight per frame
    pub fn function(&self) -> &FrozenTally {
        &self.function
    }

    /// Weight per frame when it is the leaf
    pub fn exclusive(&self) -> &FrozenTally {
        &self.exclusive
    }

    /// Same values as [`Aggregation::exclusive`], ranked separately in reports
    pub fn leaf(&self) -> &FrozenTally {
        &self.leaf
    }

    pub fn call_edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn memory(&self) -> &MemoryTally {
        &self.memory
    }

    /// Accepted samples
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Denominator of every percentage
    pub fn total_weight(&self) -> i64 {
        self.total_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> StackAggregator {
        StackAggregator::from_config(&AnalyzerConfig::default())
    }

    #[test]
    fn test_recursion_counts_each_occurrence() {
        let mut agg = aggregator();
        agg.record(&Sample::new(vec!["a", "a", "a"], 5));

        let frozen = agg.freeze();
        assert_eq!(frozen.function().get("a"), 15);
        assert_eq!(frozen.exclusive().get("a"), 5);
        assert_eq!(frozen.leaf().get("a"), 5);
        assert_eq!(frozen.call_edges().edge_count(), 1);
        assert!(frozen.call_edges().contains("a", "a"));
    }

    #[test]
    fn test_counters_and_leaf_weights() {
        let mut agg = aggregator();
        agg.record(&Sample::new(vec!["main", "run", "compute"], 7));
        agg.record(&Sample::new(vec!["main", "run"], 3));

        assert_eq!(agg.sample_count(), 2);
        assert_eq!(agg.total_weight(), 10);

        let frozen = agg.freeze();
        assert_eq!(frozen.function().get("main"), 10);
        assert_eq!(frozen.exclusive().get("compute"), 7);
        assert_eq!(frozen.exclusive().get("run"), 3);
        assert_eq!(frozen.exclusive().sum(), frozen.total_weight());
    }

    #[test]
    fn test_memory_leaves_are_classified() {
        let mut agg = aggregator();
        agg.record(&Sample::new(vec!["main", "malloc"], 4));
        agg.record(&Sample::new(vec!["main", "realloc"], 2));
        agg.record(&Sample::new(vec!["main", "free"], 1));
        agg.record(&Sample::new(vec!["malloc", "main"], 9));

        let frozen = agg.freeze();
        let memory = frozen.memory();
        assert_eq!(memory.get("malloc").alloc, 4);
        assert_eq!(memory.get("realloc").alloc, 2);
        assert_eq!(memory.get("free").free, 1);
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn test_empty_sample_is_ignored() {
        let mut agg = aggregator();
        agg.record(&Sample::new(Vec::new(), 3));
        assert_eq!(agg.sample_count(), 0);
        assert_eq!(agg.total_weight(), 0);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let samples = vec![
            Sample::new(vec!["main", "a", "malloc"], 3),
            Sample::new(vec!["main", "b"], 2),
            Sample::new(vec!["main", "a", "free"], 1),
            Sample::new(vec!["main", "b", "b"], 4),
        ];

        let mut single = aggregator();
        for sample in &samples {
            single.record(sample);
        }

        let mut left = aggregator();
        let mut right = aggregator();
        for sample in &samples[..2] {
            left.record(sample);
        }
        for sample in &samples[2..] {
            right.record(sample);
        }
        left.merge(right);

        assert_eq!(left.freeze(), single.freeze());
    }

    #[test]
    fn test_huge_weights_saturate() {
        let mut agg = aggregator();
        agg.record(&Sample::new(vec!["main", "a"], i64::MAX));
        agg.record(&Sample::new(vec!["main", "b"], i64::MAX - 1));

        assert_eq!(agg.total_weight(), i64::MAX);
        let frozen = agg.freeze();
        assert_eq!(frozen.function().get("main"), i64::MAX);
        assert_eq!(frozen.exclusive().get("b"), i64::MAX - 1);
    }
}
