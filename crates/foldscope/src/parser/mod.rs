//! Folded stack input parsing.
//!
//! This module handles:
//! - Splitting a raw line into frames and a weight
//! - Lenient fallbacks for malformed lines
//! - Weight policy and strict-mode warnings

pub mod folded;

// Re-export main types
pub use folded::{
    parse_line, LineParser, ParseStats, ParseWarning, ParseWarningKind, ParsedLine, Sample,
};
