//! Inclusive calendar date intervals
//!
//! A [`DateInterval`] covers every day from `start` to `end`, both included.
//! The constructor refuses reversed bounds, so any interval in hand satisfies
//! `start <= end`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TrackerError, TrackerResult};

/// An inclusive `[start, end]` range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked bounds as they appear on disk or in an export
#[derive(Deserialize)]
struct RawInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawInterval> for DateInterval {
    type Error = TrackerError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        DateInterval::new(raw.start, raw.end)
    }
}

impl DateInterval {
    /// Create an interval, failing with `InvalidRange` when `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> TrackerResult<Self> {
        if start > end {
            return Err(TrackerError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The interval holding a single day
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Every representable day
    pub fn all_time() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    pub fn is_all_time(&self) -> bool {
        self.start == NaiveDate::MIN && self.end == NaiveDate::MAX
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterate over each day in order
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// The overlap of two intervals, if any
    pub fn intersect(&self, other: &DateInterval) -> Option<DateInterval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateInterval { start, end })
    }

}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all_time() {
            write!(f, "All time")
        } else if self.is_single_day() {
            write!(f, "{}", self.start.format("%Y-%m-%d"))
        } else {
            write!(
                f,
                "{} to {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }
}

/// Calendar unit a period is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodUnit {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" | "daily" => Ok(Self::Day),
            "week" | "weeks" | "weekly" => Ok(Self::Week),
            "month" | "months" | "monthly" => Ok(Self::Month),
            "year" | "years" | "yearly" => Ok(Self::Year),
            other => Err(TrackerError::Validation(format!(
                "Unknown period unit: {}",
                other
            ))),
        }
    }
}
