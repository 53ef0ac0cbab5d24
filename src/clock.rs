//! Source of "today"
//!
//! Relative date phrases and default report anchors are computed from a
//! [`Clock`] handed in by the caller, never from an ambient global, so tests
//! can pin the current date.

use chrono::{Local, NaiveDate};

/// Provides the current calendar date
pub trait Clock {
    /// Today's date in the user's local calendar
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the machine's local time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
