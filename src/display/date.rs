//! Output for `expense resolve`

use chrono::NaiveDate;

use crate::config::Settings;
use crate::dates::{format_relative, format_with, ResolvedDate};

/// Describe what a date expression resolved to
pub fn format_resolved(resolved: &ResolvedDate, settings: &Settings, today: NaiveDate) -> String {
    match resolved {
        ResolvedDate::Day { date } => format!(
            "{} ({}, {})",
            date.format("%Y-%m-%d"),
            format_with(*date, &settings.long_date_format),
            format_relative(*date, today)
        ),
        ResolvedDate::Range { interval } => format!(
            "{} ({} day(s), {} through {})",
            interval,
            interval.days(),
            format_with(interval.start(), &settings.short_date_format),
            format_with(interval.end(), &settings.short_date_format)
        ),
    }
}
