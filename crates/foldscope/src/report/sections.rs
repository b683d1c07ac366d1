//! Report section selectors.

use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One selectable report section
///
/// The basic statistics header is not a section; it is always rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    Inclusive,
    Exclusive,
    Leaf,
    Category,
    Memory,
    Pattern,
    Performance,
    CallGraph,
}

impl ReportSection {
    /// Every section in rendering order
    pub const ALL: [ReportSection; 8] = [
        ReportSection::Inclusive,
        ReportSection::Exclusive,
        ReportSection::Leaf,
        ReportSection::Category,
        ReportSection::Memory,
        ReportSection::Pattern,
        ReportSection::Performance,
        ReportSection::CallGraph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inclusive => "inclusive",
            Self::Exclusive => "exclusive",
            Self::Leaf => "leaf",
            Self::Category => "category",
            Self::Memory => "memory",
            Self::Pattern => "pattern",
            Self::Performance => "performance",
            Self::CallGraph => "call",
        }
    }
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportSection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inclusive" => Ok(Self::Inclusive),
            "exclusive" => Ok(Self::Exclusive),
            "leaf" => Ok(Self::Leaf),
            "category" => Ok(Self::Category),
            "memory" => Ok(Self::Memory),
            "pattern" | "mogan" => Ok(Self::Pattern),
            "performance" => Ok(Self::Performance),
            "call" | "call-graph" | "call_graph" => Ok(Self::CallGraph),
            other => Err(ConfigError::Invalid(format!(
                "Unknown analysis section '{}' (expected one of: {}, all)",
                other,
                ReportSection::ALL
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// Parse a comma-separated section list
///
/// `all` expands to every section. Duplicates are dropped and the result is
/// returned in rendering order, so `memory,inclusive` renders inclusive first.
///
/// # Errors
/// * `ConfigError::Invalid` - unknown selector or empty list
pub fn parse_sections(list: &str) -> Result<Vec<ReportSection>, ConfigError> {
    let mut selected = Vec::new();

    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token.eq_ignore_ascii_case("all") {
            return Ok(ReportSection::ALL.to_vec());
        }
        selected.push(token.parse::<ReportSection>()?);
    }

    if selected.is_empty() {
        return Err(ConfigError::Invalid(
            "At least one analysis section must be selected".to_string(),
        ));
    }

    Ok(ReportSection::ALL
        .into_iter()
        .filter(|section| selected.contains(section))
        .collect())
}
