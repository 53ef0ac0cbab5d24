//! Free-form date expression resolution
//!
//! An expression is normalised and then offered to an ordered list of
//! matchers. Each matcher either ignores the text, resolves it, or rejects
//! it outright; a rejection ends the search so malformed input is never
//! picked up by a looser rule further down.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

use super::period::period_interval;
use crate::clock::Clock;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{DateInterval, PeriodUnit};

/// What an expression resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResolvedDate {
    Day { date: NaiveDate },
    Range { interval: DateInterval },
}

impl ResolvedDate {
    /// The covered interval; a single day becomes a one-day interval
    pub fn interval(&self) -> DateInterval {
        match self {
            Self::Day { date } => DateInterval::single_day(*date),
            Self::Range { interval } => *interval,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.interval().start()
    }

    pub fn end(&self) -> NaiveDate {
        self.interval().end()
    }

    pub fn as_day(&self) -> Option<NaiveDate> {
        match self {
            Self::Day { date } => Some(*date),
            Self::Range { .. } => None,
        }
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day { date } => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Range { interval } => write!(f, "{}", interval),
        }
    }
}

/// Result of offering normalised text to one matcher
enum MatchOutcome {
    NoMatch,
    Matched(ResolvedDate),
    Rejected(TrackerError),
}

type Matcher = fn(&str, NaiveDate) -> MatchOutcome;

/// Tried in order; the first outcome other than `NoMatch` is final
const MATCHERS: &[(&str, Matcher)] = &[
    ("absolute", match_absolute),
    ("relative day", match_relative_day),
    ("relative period", match_relative_period),
    ("range", match_range),
];

/// Range separators, longest first so `--` is not read as `-`
const RANGE_SEPARATORS: &[&str] = &[" through ", " to ", " -- ", " - ", ".."];

/// Resolves date expressions against an injected clock
pub struct DateResolver<'a> {
    clock: &'a dyn Clock,
}

impl<'a> DateResolver<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// Resolve an expression to a day or an interval
    pub fn resolve(&self, expression: &str) -> TrackerResult<ResolvedDate> {
        let text = normalize(expression);
        if text.is_empty() {
            return Err(TrackerError::date_parse(expression));
        }

        let today = self.clock.today();
        for (name, matcher) in MATCHERS {
            match matcher(&text, today) {
                MatchOutcome::NoMatch => trace!(matcher = name, "no match"),
                MatchOutcome::Matched(resolved) => {
                    debug!(expression, matcher = name, %resolved, "resolved date expression");
                    return Ok(resolved);
                }
                MatchOutcome::Rejected(err) => {
                    debug!(expression, matcher = name, error = %err, "date expression rejected");
                    return Err(with_input(err, expression));
                }
            }
        }

        debug!(expression, "date expression matched no rule");
        Err(TrackerError::date_parse(expression))
    }

    /// Resolve and widen to an interval
    pub fn resolve_interval(&self, expression: &str) -> TrackerResult<DateInterval> {
        self.resolve(expression).map(|resolved| resolved.interval())
    }
}

/// Parse a single absolute date in any accepted format
pub fn parse_absolute_date(text: &str) -> TrackerResult<NaiveDate> {
    match match_absolute(&normalize(text), NaiveDate::MIN) {
        MatchOutcome::Matched(ResolvedDate::Day { date }) => Ok(date),
        _ => Err(TrackerError::date_parse(text)),
    }
}

/// Lower-case, collapse whitespace and strip surrounding punctuation
fn normalize(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    collapsed
        .trim_start_matches(|c: char| "\"'`([{,;:".contains(c) || c.is_whitespace())
        .trim_end_matches(|c: char| "\"'`)]},;:.!?".contains(c) || c.is_whitespace())
        .to_string()
}

/// Rejections report the text the user typed, not the normalised form
fn with_input(err: TrackerError, expression: &str) -> TrackerError {
    match err {
        TrackerError::DateParse { .. } => TrackerError::date_parse(expression),
        other => other,
    }
}

/// Field order of a date-shaped string
enum Layout {
    YearFirst,
    DayFirst,
}

fn match_absolute(text: &str, _today: NaiveDate) -> MatchOutcome {
    let Some(separator) = text.chars().find(|c| !c.is_ascii_digit()) else {
        return MatchOutcome::NoMatch;
    };
    if !matches!(separator, '-' | '/' | '.') {
        return MatchOutcome::NoMatch;
    }

    let fields: Vec<&str> = text.split(separator).collect();
    if fields.len() != 3
        || fields
            .iter()
            .any(|f| f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()))
    {
        return MatchOutcome::NoMatch;
    }

    let short = |f: &str| f.len() <= 2;
    let layout = match (fields[0].len(), fields[2].len()) {
        (4, _) if short(fields[1]) && short(fields[2]) && separator != '.' => Layout::YearFirst,
        (_, 4) if short(fields[0]) && short(fields[1]) => Layout::DayFirst,
        _ => return MatchOutcome::NoMatch,
    };

    // Fields are at most four ASCII digits, so these cannot overflow
    let number = |f: &str| f.parse::<u32>().unwrap_or(0);
    let date = match layout {
        Layout::YearFirst => {
            let year = number(fields[0]) as i32;
            NaiveDate::from_ymd_opt(year, number(fields[1]), number(fields[2]))
        }
        Layout::DayFirst => {
            let year = number(fields[2]) as i32;
            let (first, second) = (number(fields[0]), number(fields[1]));
            let day_first = NaiveDate::from_ymd_opt(year, second, first);
            // Dotted dates are always DD.MM.YYYY
            if separator == '.' {
                day_first
            } else {
                day_first.or_else(|| NaiveDate::from_ymd_opt(year, first, second))
            }
        }
    };

    match date {
        Some(date) => MatchOutcome::Matched(ResolvedDate::Day { date }),
        None => MatchOutcome::Rejected(TrackerError::date_parse(text)),
    }
}

fn match_relative_day(text: &str, today: NaiveDate) -> MatchOutcome {
    let shifted = |days: i64| {
        Duration::try_days(days)
            .and_then(|delta| today.checked_add_signed(delta))
            .map_or_else(
                || MatchOutcome::Rejected(TrackerError::date_parse(text)),
                |date| MatchOutcome::Matched(ResolvedDate::Day { date }),
            )
    };

    match text {
        "today" | "now" => return shifted(0),
        "yesterday" => return shifted(-1),
        "tomorrow" => return shifted(1),
        _ => {}
    }

    let Some(rest) = text.strip_suffix("ago") else {
        return MatchOutcome::NoMatch;
    };
    let rest = rest.trim_end();
    let Some(count) = rest
        .strip_suffix("days")
        .or_else(|| rest.strip_suffix("day"))
        .map(str::trim_end)
    else {
        return MatchOutcome::NoMatch;
    };

    if count.is_empty() || !count.chars().all(|c| c.is_ascii_digit()) {
        return MatchOutcome::NoMatch;
    }

    match count.parse::<i64>() {
        Ok(n) => shifted(-n),
        Err(_) => MatchOutcome::Rejected(TrackerError::date_parse(text)),
    }
}

fn match_relative_period(text: &str, today: NaiveDate) -> MatchOutcome {
    let Some((which, unit)) = text.split_once(' ') else {
        return MatchOutcome::NoMatch;
    };

    let offset = match which {
        "this" => 0,
        "last" => -1,
        "next" => 1,
        _ => return MatchOutcome::NoMatch,
    };
    let unit = match unit {
        "week" => PeriodUnit::Week,
        "month" => PeriodUnit::Month,
        "year" => PeriodUnit::Year,
        _ => return MatchOutcome::NoMatch,
    };

    match period_interval(today, unit, offset) {
        Ok(interval) => MatchOutcome::Matched(ResolvedDate::Range { interval }),
        Err(err) => MatchOutcome::Rejected(err),
    }
}

fn match_range(text: &str, today: NaiveDate) -> MatchOutcome {
    let Some((left, right)) = RANGE_SEPARATORS
        .iter()
        .find_map(|separator| text.split_once(separator))
    else {
        return MatchOutcome::NoMatch;
    };

    let side = |part: &str| match match_absolute(part.trim(), today) {
        MatchOutcome::Matched(resolved) => Some(resolved.start()),
        _ => None,
    };
    let (Some(start), Some(end)) = (side(left), side(right)) else {
        return MatchOutcome::Rejected(TrackerError::date_parse(text));
    };

    match DateInterval::new(start, end) {
        Ok(interval) => MatchOutcome::Matched(ResolvedDate::Range { interval }),
        Err(err) => MatchOutcome::Rejected(err),
    }
}
