//! Human-facing date formatting

use chrono::NaiveDate;

/// Describe `date` relative to `today` ("yesterday", "3 weeks ago", "in 2 days")
pub fn format_relative(date: NaiveDate, today: NaiveDate) -> String {
    let diff = (today - date).num_days();

    match diff {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        -1 => "tomorrow".to_string(),
        2..=6 => format!("{} days ago", diff),
        7..=29 => counted(diff / 7, "week", true),
        30..=364 => counted(diff / 30, "month", true),
        d if d >= 365 => counted(d / 365, "year", true),
        -6..=-2 => format!("in {} days", -diff),
        -29..=-7 => counted(-diff / 7, "week", false),
        _ => counted(-diff / 30, "month", false),
    }
}

fn counted(n: i64, unit: &str, past: bool) -> String {
    let plural = if n == 1 { "" } else { "s" };
    if past {
        format!("{} {}{} ago", n, unit, plural)
    } else {
        format!("in {} {}{}", n, unit, plural)
    }
}

/// Format with a strftime pattern, falling back to ISO when the pattern is unusable
pub fn format_with(date: NaiveDate, pattern: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_relative_past() {
        let today = day(2024, 6, 15);
        assert_eq!(format_relative(today, today), "today");
        assert_eq!(format_relative(day(2024, 6, 14), today), "yesterday");
        assert_eq!(format_relative(day(2024, 6, 12), today), "3 days ago");
        assert_eq!(format_relative(day(2024, 6, 8), today), "1 week ago");
        assert_eq!(format_relative(day(2024, 5, 25), today), "3 weeks ago");
        assert_eq!(format_relative(day(2024, 4, 1), today), "2 months ago");
        assert_eq!(format_relative(day(2022, 6, 1), today), "2 years ago");
    }

    #[test]
    fn test_format_relative_future() {
        let today = day(2024, 6, 15);
        assert_eq!(format_relative(day(2024, 6, 16), today), "tomorrow");
        assert_eq!(format_relative(day(2024, 6, 19), today), "in 4 days");
        assert_eq!(format_relative(day(2024, 6, 29), today), "in 2 weeks");
        assert_eq!(format_relative(day(2024, 9, 1), today), "in 2 months");
    }

    #[test]
    fn test_format_with() {
        let date = day(2024, 1, 5);
        assert_eq!(format_with(date, "%A, %B %d, %Y"), "Friday, January 05, 2024");
        assert_eq!(format_with(date, "%m/%d/%y"), "01/05/24");
        assert_eq!(format_with(date, "%Q"), "2024-01-05");
    }
}
