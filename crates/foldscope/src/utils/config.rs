//! Configuration and constants for the analyzer.
//!
//! Every policy knob (category list, memory heuristics, outlier thresholds)
//! lives in [`AnalyzerConfig`], which can be loaded from TOML and is passed
//! to constructors explicitly.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default length of every ranked table
pub const DEFAULT_TOP_N: usize = 20;
pub const MAX_TOP_N: usize = 1000;

pub const DEFAULT_DISPLAY_WIDTH: usize = 100;
pub const DEFAULT_LEAF_DISPLAY_WIDTH: usize = 120;

/// Bucket for frames no category pattern matches
pub const FALLBACK_CATEGORY: &str = "other";

// (category name, substring) in priority order
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("MoganSTEM", "MoganSTEM"),
    ("Qt", "Qt"),
    ("AppKit", "AppKit"),
    ("CoreFoundation", "CoreFoundation"),
    ("libsystem_malloc", "libsystem_malloc"),
    ("libsystem_kernel", "libsystem_kernel"),
    ("QuartzCore", "QuartzCore"),
    ("Foundation", "Foundation"),
    ("HIToolbox", "HIToolbox"),
    ("CoreText", "CoreText"),
    ("iiiSTEM", "iiiSTEM"),
    ("libqcocoa", "libqcocoa.dylib"),
    ("libqsvgicon", "libqsvgicon.dylib"),
    ("libxpc", "libxpc.dylib"),
    ("libdispatch", "libdispatch.dylib"),
    ("libobjc", "libobjc.A.dylib"),
    ("libswiftCore", "libswiftCore.dylib"),
];

/// Leaf substrings that mark an allocation site (checked before free)
pub const DEFAULT_ALLOC_PATTERNS: &[&str] = &["malloc", "calloc", "realloc"];
pub const DEFAULT_FREE_PATTERNS: &[&str] = &["free"];

pub const DEFAULT_PATTERN_TOKENS: &[&str] = &["MoganSTEM", "iiiSTEM"];

/// One ordered category rule: frames containing `pattern` land in `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub pattern: String,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// Policy constants for the allocation/free heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryThresholds {
    /// free/alloc below this is flagged as a possible leak
    pub low_ratio: f64,

    /// free/alloc above this is flagged as cache release or sampling skew
    pub high_ratio: f64,

    /// A leaf is a leak candidate only if alloc > free * leak_multiplier
    pub leak_multiplier: i64,

    /// ... and alloc - free > leak_min_difference
    pub leak_min_difference: i64,

    /// Substrings marking allocation-family leaves
    pub alloc_patterns: Vec<String>,

    /// Substrings marking free-family leaves
    pub free_patterns: Vec<String>,
}

impl Default for MemoryThresholds {
    fn default() -> Self {
        Self {
            low_ratio: 0.8,
            high_ratio: 1.2,
            leak_multiplier: 2,
            leak_min_difference: 10,
            alloc_patterns: DEFAULT_ALLOC_PATTERNS.iter().map(|s| s.to_string()).collect(),
            free_patterns: DEFAULT_FREE_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Thresholds for the "high cost" outlier view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceThresholds {
    /// Only this many top-ranked entries are examined
    pub window: usize,

    /// Inclusive percentage that must be exceeded
    pub inclusive_percent: f64,

    /// Exclusive percentage that must be exceeded
    pub exclusive_percent: f64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            window: 20,
            inclusive_percent: 2.0,
            exclusive_percent: 1.0,
        }
    }
}

/// What to do with zero or negative sample weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Use the parsed weight verbatim
    #[default]
    PassThrough,
    /// Drop lines whose weight is zero or negative
    Reject,
    /// Raise negative weights to zero
    Clamp,
}

impl std::str::FromStr for WeightPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pass_through" | "passthrough" => Ok(Self::PassThrough),
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            other => Err(ConfigError::Invalid(format!(
                "Unknown weight policy '{}' (expected pass-through, reject or clamp)",
                other
            ))),
        }
    }
}

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Ordered category rules; first match wins
    pub categories: Vec<CategoryRule>,

    /// Name of the bucket for unmatched frames
    pub fallback_category: String,

    pub memory: MemoryThresholds,

    pub performance: PerformanceThresholds,

    /// Ordered tokens for the pattern-search view; later tokens are fallbacks
    pub pattern_tokens: Vec<String>,

    /// Frame name display width in ranked tables
    pub display_width: usize,

    /// Frame name display width in the leaf ranking
    pub leaf_display_width: usize,

    pub weight_policy: WeightPolicy,

    /// Record a warning for every lenient parse instead of defaulting silently
    pub strict: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, pattern)| CategoryRule::new(*name, *pattern))
                .collect(),
            fallback_category: FALLBACK_CATEGORY.to_string(),
            memory: MemoryThresholds::default(),
            performance: PerformanceThresholds::default(),
            pattern_tokens: DEFAULT_PATTERN_TOKENS.iter().map(|s| s.to_string()).collect(),
            display_width: DEFAULT_DISPLAY_WIDTH,
            leaf_display_width: DEFAULT_LEAF_DISPLAY_WIDTH,
            weight_policy: WeightPolicy::default(),
            strict: false,
        }
    }
}

impl AnalyzerConfig {
    /// Check internal consistency
    ///
    /// # Errors
    /// * `ConfigError::Invalid` - describes the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, rule) in self.categories.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Category #{} has an empty name",
                    index + 1
                )));
            }
            if rule.pattern.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Category '{}' has an empty pattern",
                    rule.name
                )));
            }
        }

        if self.fallback_category.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Fallback category name cannot be empty".to_string(),
            ));
        }

        let memory = &self.memory;
        if memory.low_ratio <= 0.0 || memory.high_ratio <= 0.0 {
            return Err(ConfigError::Invalid(
                "Memory ratio bounds must be positive".to_string(),
            ));
        }
        if memory.low_ratio > memory.high_ratio {
            return Err(ConfigError::Invalid(format!(
                "memory.low_ratio ({}) exceeds memory.high_ratio ({})",
                memory.low_ratio, memory.high_ratio
            )));
        }
        if memory.leak_multiplier <= 0 || memory.leak_min_difference < 0 {
            return Err(ConfigError::Invalid(
                "Leak multiplier must be positive and minimum difference non-negative".to_string(),
            ));
        }
        if memory.alloc_patterns.iter().chain(&memory.free_patterns).any(|p| p.is_empty()) {
            return Err(ConfigError::Invalid(
                "Allocation/free patterns cannot be empty strings".to_string(),
            ));
        }

        let perf = &self.performance;
        if perf.window == 0 {
            return Err(ConfigError::Invalid(
                "performance.window must be greater than 0".to_string(),
            ));
        }
        if perf.inclusive_percent < 0.0 || perf.exclusive_percent < 0.0 {
            return Err(ConfigError::Invalid(
                "Performance thresholds cannot be negative".to_string(),
            ));
        }

        if self.pattern_tokens.iter().any(|t| t.is_empty()) {
            return Err(ConfigError::Invalid(
                "Pattern tokens cannot be empty strings".to_string(),
            ));
        }

        if self.display_width == 0 || self.leaf_display_width == 0 {
            return Err(ConfigError::Invalid(
                "Display widths must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load analyzer configuration from a TOML file
///
/// Missing fields fall back to their defaults. The result is validated.
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid
/// * `ConfigError::Invalid` - If values are inconsistent
///
/// # Example
/// ```ignore
/// let config = load_config("foldscope.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalyzerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AnalyzerConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
