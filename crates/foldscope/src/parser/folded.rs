//! Folded stack line parser.
//!
//! Each input line encodes one call stack, root first, plus a weight:
//! `frame1;frame2;...;frameN WEIGHT`.
//!
//! Parsing is lenient. A line whose trailing token is not an integer is
//! kept as a whole-line stack with weight 1 instead of failing the run.
//! Every such fallback is counted in [`ParseStats`] and, in strict mode,
//! recorded as a [`ParseWarning`]. An integer tail outside the `i64` range
//! saturates to the nearest bound and is flagged as `WeightOutOfRange`.
//!
//! Empty frame names (`a;;b`) are dropped from the stack but still break
//! adjacency: `a;;b` yields frames `[a, b]` and no `a→b` call.

use crate::utils::config::{AnalyzerConfig, WeightPolicy};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;

/// Longest line prefix kept in a warning
const EXCERPT_CHARS: usize = 80;

/// One parsed input line: frames root→leaf and a weight
///
/// Frames borrow from the line they were parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample<'a> {
    pub frames: Vec<&'a str>,
    pub weight: i64,

    /// Indices `i` where an empty frame sat between `frames[i - 1]` and
    /// `frames[i]`
    pub gaps: Vec<usize>,
}

impl<'a> Sample<'a> {
    pub fn new(frames: Vec<&'a str>, weight: i64) -> Self {
        Self {
            frames,
            weight,
            gaps: Vec::new(),
        }
    }

    /// Final frame of the stack
    pub fn leaf(&self) -> Option<&'a str> {
        self.frames.last().copied()
    }

    /// (caller, callee) pairs that were adjacent in the input
    pub fn calls(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.frames
            .windows(2)
            .enumerate()
            .filter(|(index, _)| !self.gaps.contains(&(index + 1)))
            .map(|(_, pair)| (pair[0], pair[1]))
    }
}

/// Result of parsing a single line, before any weight policy applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// Whitespace only
    Blank,
    /// Well-formed line with an explicit weight
    Sample(Sample<'a>),
    /// No parseable weight; whole line taken as the stack with weight 1
    Fallback(Sample<'a>),
    /// Integer weight beyond `i64`, saturated to the nearest bound
    OutOfRange(Sample<'a>),
    /// Nothing but separators; contributes nothing
    EmptyStack,
}

/// Why a line did not parse cleanly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "weight")]
pub enum ParseWarningKind {
    LenientFallback,
    EmptyStack,
    WeightOutOfRange,
    NonPositiveWeight(i64),
    ClampedWeight(i64),
}

impl fmt::Display for ParseWarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LenientFallback => write!(f, "no trailing weight, defaulted to 1"),
            Self::EmptyStack => write!(f, "no frames, line ignored"),
            Self::WeightOutOfRange => write!(f, "weight outside the 64-bit range, saturated"),
            Self::NonPositiveWeight(w) => write!(f, "non-positive weight {}, line rejected", w),
            Self::ClampedWeight(w) => write!(f, "negative weight {} clamped to 0", w),
        }
    }
}

/// A per-line irregularity surfaced in strict mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number in the input
    pub line_number: usize,

    pub kind: ParseWarningKind,

    /// Start of the offending line
    pub excerpt: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.kind, self.excerpt)
    }
}

/// Line-level counters for one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Every line read, blank ones included
    pub lines_seen: usize,

    pub blank_lines: usize,

    /// Lines that produced a sample (fallbacks included)
    pub parsed_lines: usize,

    /// Lines accepted with the default weight of 1
    pub fallback_lines: usize,

    /// Non-blank lines that produced no sample
    pub rejected_lines: usize,
}

impl ParseStats {
    /// Add another scan's counters into this one
    pub fn merge(&mut self, other: &ParseStats) {
        self.lines_seen += other.lines_seen;
        self.blank_lines += other.blank_lines;
        self.parsed_lines += other.parsed_lines;
        self.fallback_lines += other.fallback_lines;
        self.rejected_lines += other.rejected_lines;
    }

    /// Lines that needed leniency or were dropped
    pub fn irregular_lines(&self) -> usize {
        self.fallback_lines + self.rejected_lines
    }
}

/// Parse one raw line into a sample
///
/// **Public** - pure function, no policy applied
///
/// # Algorithm
/// 1. Trim; empty → `Blank`
/// 2. Split at the last `;`; an integer tail is the weight
/// 3. Otherwise split at the last whitespace; an integer tail is the weight
/// 4. Otherwise the whole line is the stack, weight 1 (`Fallback`)
/// 5. Split the stack on `;`, dropping empty frame names but remembering
///    where they broke adjacency
pub fn parse_line(raw: &str) -> ParsedLine<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return ParsedLine::Blank;
    }

    let (stack_str, weight) = match split_weight(line) {
        Some((stack, weight)) => (stack, Some(weight)),
        None => (line, None),
    };

    let mut frames = Vec::new();
    let mut gaps = Vec::new();
    let mut after_gap = false;
    for name in stack_str.split(';') {
        if name.is_empty() {
            after_gap = true;
            continue;
        }
        if after_gap && !frames.is_empty() {
            gaps.push(frames.len());
        }
        after_gap = false;
        frames.push(name);
    }
    if frames.is_empty() {
        return ParsedLine::EmptyStack;
    }

    let sample = |weight| Sample {
        frames,
        weight,
        gaps,
    };
    match weight {
        Some(Weight::Exact(weight)) => ParsedLine::Sample(sample(weight)),
        Some(Weight::Saturated(weight)) => ParsedLine::OutOfRange(sample(weight)),
        None => ParsedLine::Fallback(sample(1)),
    }
}

/// Trailing weight token after integer parsing
#[derive(Debug, Clone, Copy)]
enum Weight {
    Exact(i64),
    Saturated(i64),
}

/// Separate the trailing weight from the stack string
///
/// **Private** - internal helper for parse_line
fn split_weight(line: &str) -> Option<(&str, Weight)> {
    if let Some((stack, tail)) = line.rsplit_once(';') {
        if let Some(weight) = parse_weight(tail.trim()) {
            return Some((stack, weight));
        }
    }

    let split_at = line.rfind(char::is_whitespace)?;
    let (stack, tail) = line.split_at(split_at);
    parse_weight(tail.trim()).map(|weight| (stack.trim_end(), weight))
}

fn parse_weight(token: &str) -> Option<Weight> {
    match token.parse::<i64>() {
        Ok(weight) => Some(Weight::Exact(weight)),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(Weight::Saturated(i64::MAX)),
            IntErrorKind::NegOverflow => Some(Weight::Saturated(i64::MIN)),
            _ => None,
        },
    }
}

/// Stateful parser for one scan: applies the weight policy and keeps counters
#[derive(Debug, Clone)]
pub struct LineParser {
    policy: WeightPolicy,
    strict: bool,
    stats: ParseStats,
    warnings: Vec<ParseWarning>,
}

impl LineParser {
    pub fn new(policy: WeightPolicy, strict: bool) -> Self {
        Self {
            policy,
            strict,
            stats: ParseStats::default(),
            warnings: Vec::new(),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.weight_policy, config.strict)
    }

    /// Parse the next line of the input
    ///
    /// Returns the sample to aggregate, or `None` if the line contributes
    /// nothing. Never fails.
    pub fn feed<'a>(&mut self, raw: &'a str) -> Option<Sample<'a>> {
        self.stats.lines_seen += 1;
        let line_number = self.stats.lines_seen;

        let (mut sample, is_fallback) = match parse_line(raw) {
            ParsedLine::Blank => {
                self.stats.blank_lines += 1;
                return None;
            }
            ParsedLine::EmptyStack => {
                self.stats.rejected_lines += 1;
                self.note(line_number, ParseWarningKind::EmptyStack, raw);
                return None;
            }
            ParsedLine::Sample(sample) => (sample, false),
            ParsedLine::Fallback(sample) => (sample, true),
            ParsedLine::OutOfRange(sample) => {
                self.note(line_number, ParseWarningKind::WeightOutOfRange, raw);
                (sample, false)
            }
        };

        match self.policy {
            WeightPolicy::PassThrough => {}
            WeightPolicy::Reject if sample.weight <= 0 => {
                self.stats.rejected_lines += 1;
                self.note(line_number, ParseWarningKind::NonPositiveWeight(sample.weight), raw);
                return None;
            }
            WeightPolicy::Clamp if sample.weight < 0 => {
                self.note(line_number, ParseWarningKind::ClampedWeight(sample.weight), raw);
                sample.weight = 0;
            }
            WeightPolicy::Reject | WeightPolicy::Clamp => {}
        }

        if is_fallback {
            self.stats.fallback_lines += 1;
            self.note(line_number, ParseWarningKind::LenientFallback, raw);
        }

        self.stats.parsed_lines += 1;
        Some(sample)
    }

    /// Record an irregular line; kept and logged only in strict mode
    fn note(&mut self, line_number: usize, kind: ParseWarningKind, raw: &str) {
        if !self.strict {
            debug!("Line {}: {}", line_number, kind);
            return;
        }

        let warning = ParseWarning {
            line_number,
            kind,
            excerpt: excerpt(raw),
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Consume the parser, handing back its counters and warnings
    pub fn finish(self) -> (ParseStats, Vec<ParseWarning>) {
        (self.stats, self.warnings)
    }
}

fn excerpt(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= EXCERPT_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", head)
    }
}
