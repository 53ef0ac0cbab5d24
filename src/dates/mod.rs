//! Date handling: expression resolution, period arithmetic and formatting

pub mod format;
pub mod period;
pub mod resolver;

pub use format::{format_relative, format_with};
pub use period::{period_interval, PeriodCalculator};
pub use resolver::{parse_absolute_date, DateResolver, ResolvedDate};
