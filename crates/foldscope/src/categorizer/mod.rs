//! Ordered substring categorization of frame names.
//!
//! Each frame lands in exactly one bucket: the first configured rule whose
//! pattern is contained in the name, or the fallback bucket. Rule order is
//! significant because patterns may overlap.

use crate::aggregator::tally::FrozenTally;
use crate::utils::config::{AnalyzerConfig, CategoryRule};
use log::debug;
use serde::{Deserialize, Serialize};

/// Running total for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub name: String,

    pub weight: i64,

    /// Distinct frames assigned here
    pub frames: usize,
}

/// Bucket totals in rule order, fallback last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    buckets: Vec<CategoryBucket>,
}

impl CategoryTotals {
    pub fn buckets(&self) -> &[CategoryBucket] {
        &self.buckets
    }

    pub fn get(&self, name: &str) -> i64 {
        self.buckets
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.weight)
            .unwrap_or(0)
    }

    pub fn sum(&self) -> i64 {
        self.buckets.iter().fold(0, |acc, b| acc.saturating_add(b.weight))
    }

    /// Buckets that received at least one frame, heaviest first; ties keep
    /// rule order
    pub fn ranked(&self) -> Vec<&CategoryBucket> {
        let mut touched: Vec<&CategoryBucket> =
            self.buckets.iter().filter(|b| b.frames > 0).collect();
        touched.sort_by(|a, b| b.weight.cmp(&a.weight));
        touched
    }
}

/// First-match-wins categorizer
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.categories.clone(), config.fallback_category.clone())
    }

    /// Bucket name for one frame
    pub fn classify(&self, frame: &str) -> &str {
        self.rules
            .get(self.bucket_index(frame))
            .map(|rule| rule.name.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    /// Index of the bucket for one frame; the fallback is `rules.len()`
    fn bucket_index(&self, frame: &str) -> usize {
        self.rules
            .iter()
            .position(|rule| frame.contains(rule.pattern.as_str()))
            .unwrap_or(self.rules.len())
    }

    /// Add every entry of `tally` to its bucket
    ///
    /// O(distinct frames × rules).
    pub fn categorize(&self, tally: &FrozenTally) -> CategoryTotals {
        let mut buckets: Vec<CategoryBucket> = self
            .rules
            .iter()
            .map(|rule| rule.name.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
            .map(|name| CategoryBucket {
                name: name.to_string(),
                weight: 0,
                frames: 0,
            })
            .collect();

        for (frame, weight) in tally.iter() {
            let bucket = &mut buckets[self.bucket_index(frame)];
            bucket.weight = bucket.weight.saturating_add(weight);
            bucket.frames += 1;
        }

        debug!(
            "Categorized {} frames into {} buckets",
            tally.len(),
            buckets.iter().filter(|b| b.frames > 0).count()
        );

        CategoryTotals { buckets }
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tally::Tally;

    #[test]
    fn test_first_match_wins() {
        let categorizer = Categorizer::new(
            vec![
                CategoryRule::new("qt-cocoa", "libqcocoa"),
                CategoryRule::new("qt", "Qt"),
            ],
            "other",
        );

        assert_eq!(categorizer.classify("libqcocoa.dylib`QtCocoaView"), "qt-cocoa");
        assert_eq!(categorizer.classify("QtCore`QObject::event"), "qt");
        assert_eq!(categorizer.classify("main"), "other");
    }

    #[test]
    fn test_rule_order_changes_assignment() {
        let frame = "libqcocoa.dylib`QtCocoaView";
        let swapped = Categorizer::new(
            vec![
                CategoryRule::new("qt", "Qt"),
                CategoryRule::new("qt-cocoa", "libqcocoa"),
            ],
            "other",
        );
        assert_eq!(swapped.classify(frame), "qt");
    }

    #[test]
    fn test_categorize_is_total() {
        let mut tally = Tally::new();
        tally.add("QtGui`paint", 7);
        tally.add("AppKit`run", 3);
        tally.add("mystery", 5);
        let tally = tally.freeze();

        let totals = Categorizer::default().categorize(&tally);
        assert_eq!(totals.get("Qt"), 7);
        assert_eq!(totals.get("AppKit"), 3);
        assert_eq!(totals.get("other"), 5);
        assert_eq!(totals.sum(), tally.sum());

        let ranked: Vec<&str> = totals.ranked().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(ranked, vec!["Qt", "other", "AppKit"]);
    }

    #[test]
    fn test_default_foundation_rule_order() {
        // CoreFoundation is listed before Foundation
        let categorizer = Categorizer::default();
        assert_eq!(categorizer.classify("CoreFoundation`CFRunLoopRun"), "CoreFoundation");
        assert_eq!(categorizer.classify("Foundation`NSRunLoop"), "Foundation");
    }
}
