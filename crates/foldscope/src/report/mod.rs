//! Report model, section selection and text rendering.
//!
//! The builder turns a frozen [`Analysis`](crate::aggregator::Analysis) into
//! [`ReportData`]; the renderer and the JSON writer only ever see that model.

pub mod builder;
pub mod schema;
pub mod sections;
pub mod text;

// Re-export main types and functions
pub use builder::{build_report, pattern_view, performance_view};
pub use schema::{
    CallGraphView, CategoryRow, CategoryView, DegreeEntry, PatternView, PerformanceView,
    ReportData, SummaryStats, WarningsView,
};
pub use sections::{parse_sections, ReportSection};
pub use text::{format_percentage, TextRenderer};
