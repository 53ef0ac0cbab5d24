//! Calendar period arithmetic
//!
//! Turns an anchor date, a unit and an offset into the exact interval of
//! that period. Weeks run Monday to Sunday. Months are walked on a running
//! month index so that stepping back from January lands in December of the
//! previous year.

use chrono::{Datelike, Duration, NaiveDate};

use crate::clock::Clock;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{DateInterval, PeriodUnit};

/// Interval of the `unit` period `offset` steps away from the one holding `anchor`
///
/// `offset = 0` is the period containing `anchor`, `-1` the one before it,
/// `+1` the one after.
pub fn period_interval(
    anchor: NaiveDate,
    unit: PeriodUnit,
    offset: i32,
) -> TrackerResult<DateInterval> {
    let out_of_range = || {
        TrackerError::Validation(format!(
            "{} {} from {} is outside the supported calendar",
            offset, unit, anchor
        ))
    };

    let (start, end) = match unit {
        PeriodUnit::Day => {
            let date = anchor
                .checked_add_signed(Duration::days(i64::from(offset)))
                .ok_or_else(out_of_range)?;
            (date, date)
        }
        PeriodUnit::Week => {
            let back = i64::from(anchor.weekday().num_days_from_monday());
            let start = anchor
                .checked_sub_signed(Duration::days(back))
                .and_then(|monday| {
                    monday.checked_add_signed(Duration::days(7 * i64::from(offset)))
                })
                .ok_or_else(out_of_range)?;
            let end = start
                .checked_add_signed(Duration::days(6))
                .ok_or_else(out_of_range)?;
            (start, end)
        }
        PeriodUnit::Month => {
            let index = i64::from(anchor.year()) * 12
                + i64::from(anchor.month0())
                + i64::from(offset);
            let year = i32::try_from(index.div_euclid(12)).map_err(|_| out_of_range())?;
            let month = index.rem_euclid(12) as u32 + 1;
            let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
            let end = month_end(year, month).ok_or_else(out_of_range)?;
            (start, end)
        }
        PeriodUnit::Year => {
            let year = anchor.year().checked_add(offset).ok_or_else(out_of_range)?;
            let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(out_of_range)?;
            let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(out_of_range)?;
            (start, end)
        }
    };

    DateInterval::new(start, end)
}

/// Last day of a calendar month
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        NaiveDate::from_ymd_opt(year, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()
    }
}

/// Consecutive 7-day chunks starting at the interval's first day; the last
/// chunk is clipped to the interval end
pub fn weeks_from_start(interval: &DateInterval) -> TrackerResult<Vec<DateInterval>> {
    let mut chunks = Vec::new();
    let mut cursor = Some(interval.start());

    while let Some(start) = cursor.filter(|d| *d <= interval.end()) {
        let end = start
            .checked_add_signed(Duration::days(6))
            .map_or(interval.end(), |d| d.min(interval.end()));
        chunks.push(DateInterval::new(start, end)?);
        cursor = end.succ_opt();
    }

    Ok(chunks)
}

/// Calendar months overlapping the interval, each clipped to it
pub fn months_within(interval: &DateInterval) -> TrackerResult<Vec<DateInterval>> {
    let mut months = Vec::new();
    let mut cursor = Some(interval.start());

    while let Some(day) = cursor.filter(|d| *d <= interval.end()) {
        let end = month_end(day.year(), day.month())
            .map_or(interval.end(), |d| d.min(interval.end()));
        months.push(DateInterval::new(day, end)?);
        cursor = end.succ_opt();
    }

    Ok(months)
}

/// Period lookups for reports, anchored on an injected clock
pub struct PeriodCalculator<'a> {
    clock: &'a dyn Clock,
}

impl<'a> PeriodCalculator<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// The period containing `anchor`, or today when no anchor is given
    pub fn containing(
        &self,
        anchor: Option<NaiveDate>,
        unit: PeriodUnit,
    ) -> TrackerResult<DateInterval> {
        period_interval(anchor.unwrap_or_else(|| self.clock.today()), unit, 0)
    }

    /// Slices of a period: days of a week, 7-day chunks of a month, months of a year
    ///
    /// A day has no slices.
    pub fn breakdown(
        &self,
        interval: &DateInterval,
        unit: PeriodUnit,
    ) -> TrackerResult<Vec<DateInterval>> {
        match unit {
            PeriodUnit::Day => Ok(Vec::new()),
            PeriodUnit::Week => Ok(interval.iter_days().map(DateInterval::single_day).collect()),
            PeriodUnit::Month => weeks_from_start(interval),
            PeriodUnit::Year => months_within(interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn interval(start: NaiveDate, end: NaiveDate) -> DateInterval {
        DateInterval::new(start, end).unwrap()
    }

    #[test]
    fn test_month_in_leap_year() {
        assert_eq!(
            period_interval(day(2024, 2, 15), PeriodUnit::Month, 0).unwrap(),
            interval(day(2024, 2, 1), day(2024, 2, 29))
        );
        assert_eq!(
            period_interval(day(2023, 2, 15), PeriodUnit::Month, 0).unwrap(),
            interval(day(2023, 2, 1), day(2023, 2, 28))
        );
    }

    #[test]
    fn test_last_month_from_january_rolls_back_a_year() {
        assert_eq!(
            period_interval(day(2024, 1, 10), PeriodUnit::Month, -1).unwrap(),
            interval(day(2023, 12, 1), day(2023, 12, 31))
        );
    }

    #[test]
    fn test_month_offsets_cross_years_both_ways() {
        assert_eq!(
            period_interval(day(2024, 11, 30), PeriodUnit::Month, 3).unwrap(),
            interval(day(2025, 2, 1), day(2025, 2, 28))
        );
        assert_eq!(
            period_interval(day(2024, 3, 31), PeriodUnit::Month, -14).unwrap(),
            interval(day(2023, 1, 1), day(2023, 1, 31))
        );
    }

    #[test]
    fn test_week_runs_monday_to_sunday() {
        // 2024-01-10 is a Wednesday
        assert_eq!(
            period_interval(day(2024, 1, 10), PeriodUnit::Week, 0).unwrap(),
            interval(day(2024, 1, 8), day(2024, 1, 14))
        );
        // Sunday belongs to the week that started the previous Monday
        assert_eq!(
            period_interval(day(2024, 1, 14), PeriodUnit::Week, 0).unwrap(),
            interval(day(2024, 1, 8), day(2024, 1, 14))
        );
        assert_eq!(
            period_interval(day(2024, 1, 3), PeriodUnit::Week, -1).unwrap(),
            interval(day(2023, 12, 25), day(2023, 12, 31))
        );
    }

    #[test]
    fn test_day_and_year() {
        assert_eq!(
            period_interval(day(2024, 3, 1), PeriodUnit::Day, -1).unwrap(),
            DateInterval::single_day(day(2024, 2, 29))
        );
        assert_eq!(
            period_interval(day(2024, 7, 4), PeriodUnit::Year, -1).unwrap(),
            interval(day(2023, 1, 1), day(2023, 12, 31))
        );
    }

    #[test]
    fn test_out_of_calendar_offset_fails() {
        let err = period_interval(day(2024, 1, 1), PeriodUnit::Year, i32::MAX).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_weeks_from_start_clips_last_chunk() {
        let chunks = weeks_from_start(&interval(day(2024, 2, 1), day(2024, 2, 29))).unwrap();
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], interval(day(2024, 2, 1), day(2024, 2, 7)));
        assert_eq!(chunks[4], DateInterval::single_day(day(2024, 2, 29)));
    }

    #[test]
    fn test_months_within_year() {
        let months = months_within(&interval(day(2023, 1, 1), day(2023, 12, 31))).unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[1], interval(day(2023, 2, 1), day(2023, 2, 28)));
        assert_eq!(months[11].end(), day(2023, 12, 31));
    }

    #[test]
    fn test_calculator_defaults_to_clock_today() {
        let clock = FixedClock(day(2024, 1, 10));
        let calculator = PeriodCalculator::new(&clock);
        assert_eq!(
            calculator.containing(None, PeriodUnit::Week).unwrap(),
            interval(day(2024, 1, 8), day(2024, 1, 14))
        );
        assert_eq!(
            calculator
                .containing(Some(day(2023, 6, 15)), PeriodUnit::Month)
                .unwrap(),
            interval(day(2023, 6, 1), day(2023, 6, 30))
        );
    }

    #[test]
    fn test_breakdown_slices() {
        let clock = FixedClock(day(2024, 1, 10));
        let calculator = PeriodCalculator::new(&clock);

        let week = interval(day(2024, 1, 8), day(2024, 1, 14));
        let days = calculator.breakdown(&week, PeriodUnit::Week).unwrap();
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(DateInterval::is_single_day));

        let february = interval(day(2024, 2, 1), day(2024, 2, 29));
        let weeks = calculator.breakdown(&february, PeriodUnit::Month).unwrap();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[4], interval(day(2024, 2, 29), day(2024, 2, 29)));

        let year = interval(day(2024, 1, 1), day(2024, 12, 31));
        assert_eq!(calculator.breakdown(&year, PeriodUnit::Year).unwrap().len(), 12);
        assert!(calculator
            .breakdown(&DateInterval::single_day(day(2024, 1, 10)), PeriodUnit::Day)
            .unwrap()
            .is_empty());
    }
}
