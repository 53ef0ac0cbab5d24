//! Reporting core
//!
//! [`aggregate`] and [`compare`] do the arithmetic; [`ReportBuilder`] wires
//! date resolution, store queries and aggregation into finished reports.

pub mod aggregation;
pub mod builder;

pub use aggregation::{
    aggregate, compare, AggregationResult, ComparisonDelta, GroupBy, GroupKey, GroupTotals,
    PercentChange,
};
pub use builder::{
    BreakdownRow, DateSpec, RangeSpec, Report, ReportBuilder, ReportKind, ReportRequest,
    ReportSection,
};
