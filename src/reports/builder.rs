//! Report assembly
//!
//! A [`ReportBuilder`] turns a [`ReportRequest`] into a [`Report`]: it
//! resolves the requested interval(s), fetches transactions from the store,
//! aggregates them and attaches any comparison. The first failure aborts the
//! build; no partial report is ever returned.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::aggregation::{
    aggregate, compare, AggregationResult, ComparisonDelta, GroupBy, GroupKey,
};
use crate::clock::Clock;
use crate::dates::{DateResolver, PeriodCalculator, ResolvedDate};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, CategoryId, DateInterval, PeriodUnit, Transaction};
use crate::storage::{TransactionQuery, TransactionStore};

/// A date given either directly or as an expression to resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSpec {
    Date(NaiveDate),
    Expression(String),
}

impl From<NaiveDate> for DateSpec {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<&str> for DateSpec {
    fn from(expression: &str) -> Self {
        Self::Expression(expression.to_string())
    }
}

impl From<String> for DateSpec {
    fn from(expression: String) -> Self {
        Self::Expression(expression)
    }
}

/// An interval to report over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSpec {
    /// Start takes the first day of its resolution, end the last
    Bounds { start: DateSpec, end: DateSpec },
    /// One expression resolved as a whole ("last month", "a to b")
    Expression(String),
    AllTime,
}

impl RangeSpec {
    pub fn bounds(start: impl Into<DateSpec>, end: impl Into<DateSpec>) -> Self {
        Self::Bounds {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// What to build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportRequest {
    Daily { anchor: Option<DateSpec> },
    Weekly { anchor: Option<DateSpec> },
    Monthly { anchor: Option<DateSpec> },
    Yearly { anchor: Option<DateSpec> },
    Category {
        category_id: CategoryId,
        range: RangeSpec,
    },
    Comparison {
        baseline: RangeSpec,
        comparand: RangeSpec,
    },
}

impl ReportRequest {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Daily { .. } => ReportKind::Daily,
            Self::Weekly { .. } => ReportKind::Weekly,
            Self::Monthly { .. } => ReportKind::Monthly,
            Self::Yearly { .. } => ReportKind::Yearly,
            Self::Category { .. } => ReportKind::Category,
            Self::Comparison { .. } => ReportKind::Comparison,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Category,
    Comparison,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Daily => "Daily Report",
            Self::Weekly => "Weekly Report",
            Self::Monthly => "Monthly Report",
            Self::Yearly => "Yearly Report",
            Self::Category => "Category Report",
            Self::Comparison => "Comparison Report",
        }
    }

    fn period_unit(&self) -> Option<PeriodUnit> {
        match self {
            Self::Daily => Some(PeriodUnit::Day),
            Self::Weekly => Some(PeriodUnit::Week),
            Self::Monthly => Some(PeriodUnit::Month),
            Self::Yearly => Some(PeriodUnit::Year),
            Self::Category | Self::Comparison => None,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One aggregated interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub label: String,
    pub interval: DateInterval,
    pub aggregation: AggregationResult,
    /// The transactions behind the aggregation, newest first
    pub transactions: Vec<Transaction>,
}

/// Totals for a slice of a period (a day of a week, a month of a year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub label: String,
    pub interval: DateInterval,
    pub totals: AggregationResult,
}

/// A finished report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub kind: ReportKind,
    /// Date the report was built, per the injected clock
    pub generated_on: NaiveDate,
    pub sections: Vec<ReportSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<BreakdownRow>,
    /// The category a category report is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonDelta>,
    /// Names for every category id appearing in the sections
    #[serde(default)]
    pub category_names: BTreeMap<CategoryId, String>,
}

impl Report {
    /// The first (for period reports, only) section
    pub fn primary(&self) -> Option<&ReportSection> {
        self.sections.first()
    }

    /// Display label for a group key, using category names when known
    pub fn key_label(&self, key: &GroupKey) -> String {
        match key {
            GroupKey::Category(id) => self
                .category_names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            other => other.to_string(),
        }
    }

    pub fn title(&self) -> String {
        match &self.category {
            Some(category) => format!("{}: {}", self.kind.title(), category.name),
            None => self.kind.title().to_string(),
        }
    }
}

/// Builds reports from a store and a clock
pub struct ReportBuilder<'a> {
    store: &'a dyn TransactionStore,
    clock: &'a dyn Clock,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(store: &'a dyn TransactionStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Build the requested report
    pub fn build(&self, request: &ReportRequest) -> TrackerResult<Report> {
        let kind = request.kind();
        info!(kind = ?kind, "building report");

        let mut report = match request {
            ReportRequest::Daily { anchor }
            | ReportRequest::Weekly { anchor }
            | ReportRequest::Monthly { anchor }
            | ReportRequest::Yearly { anchor } => self.build_period(kind, anchor.as_ref())?,
            ReportRequest::Category { category_id, range } => {
                self.build_category(*category_id, range)?
            }
            ReportRequest::Comparison {
                baseline,
                comparand,
            } => self.build_comparison(baseline, comparand)?,
        };

        report.category_names = self.category_names(&report.sections)?;
        debug!(
            kind = ?kind,
            sections = report.sections.len(),
            breakdown = report.breakdown.len(),
            "report built"
        );
        Ok(report)
    }

    fn empty_report(&self, kind: ReportKind) -> Report {
        Report {
            kind,
            generated_on: self.clock.today(),
            sections: Vec::new(),
            breakdown: Vec::new(),
            category: None,
            comparison: None,
            category_names: BTreeMap::new(),
        }
    }

    fn build_period(&self, kind: ReportKind, anchor: Option<&DateSpec>) -> TrackerResult<Report> {
        let unit = kind.period_unit().ok_or_else(|| {
            TrackerError::Validation(format!("{} is not a period report", kind))
        })?;
        let periods = PeriodCalculator::new(self.clock);
        let interval = periods.containing(self.resolve_anchor(anchor)?, unit)?;
        debug!(%interval, unit = %unit, "period resolved");

        let label = period_label(unit, &interval);
        let section = self.section(label, interval, None, GroupBy::Category)?;
        let slices = periods.breakdown(&section.interval, unit)?;
        let breakdown = breakdown_rows(unit, slices, &section);

        Ok(Report {
            sections: vec![section],
            breakdown,
            ..self.empty_report(kind)
        })
    }

    fn build_category(&self, category_id: CategoryId, range: &RangeSpec) -> TrackerResult<Report> {
        let category = self
            .store
            .find_category(category_id)?
            .ok_or_else(|| TrackerError::CategoryNotFound(category_id.to_string()))?;
        let interval = self.resolve_range(range)?;

        let label = format!("{} ({})", category.name, interval);
        let section = self.section(label, interval, Some(category_id), GroupBy::Day)?;

        Ok(Report {
            sections: vec![section],
            category: Some(category),
            ..self.empty_report(ReportKind::Category)
        })
    }

    fn build_comparison(
        &self,
        baseline: &RangeSpec,
        comparand: &RangeSpec,
    ) -> TrackerResult<Report> {
        let baseline_interval = self.resolve_range(baseline)?;
        let comparand_interval = self.resolve_range(comparand)?;

        let baseline = self.section(
            format!("Baseline ({})", baseline_interval),
            baseline_interval,
            None,
            GroupBy::Category,
        )?;
        let comparand = self.section(
            format!("Comparison ({})", comparand_interval),
            comparand_interval,
            None,
            GroupBy::Category,
        )?;
        let delta = compare(&baseline.aggregation, &comparand.aggregation);

        Ok(Report {
            sections: vec![baseline, comparand],
            comparison: Some(delta),
            ..self.empty_report(ReportKind::Comparison)
        })
    }

    /// Query one interval and aggregate it
    fn section(
        &self,
        label: String,
        interval: DateInterval,
        category_id: Option<CategoryId>,
        group_by: GroupBy,
    ) -> TrackerResult<ReportSection> {
        let mut query = TransactionQuery::new().within(interval);
        if let Some(category_id) = category_id {
            query = query.category(category_id);
        }

        let transactions = self.store.find_transactions(&query)?;
        let aggregation = aggregate(&transactions, group_by);

        Ok(ReportSection {
            label,
            interval,
            aggregation,
            transactions,
        })
    }

    fn resolver(&self) -> DateResolver<'a> {
        DateResolver::new(self.clock)
    }

    fn resolve_spec(&self, spec: &DateSpec) -> TrackerResult<ResolvedDate> {
        match spec {
            DateSpec::Date(date) => Ok(ResolvedDate::Day { date: *date }),
            DateSpec::Expression(expression) => self.resolver().resolve(expression),
        }
    }

    /// Anchor day for a period report; an interval anchors at its start
    fn resolve_anchor(&self, anchor: Option<&DateSpec>) -> TrackerResult<Option<NaiveDate>> {
        anchor
            .map(|spec| self.resolve_spec(spec).map(|resolved| resolved.start()))
            .transpose()
    }

    fn resolve_range(&self, range: &RangeSpec) -> TrackerResult<DateInterval> {
        match range {
            RangeSpec::Bounds { start, end } => {
                let start = self.resolve_spec(start)?.start();
                let end = self.resolve_spec(end)?.end();
                DateInterval::new(start, end)
            }
            RangeSpec::Expression(expression) => self.resolver().resolve_interval(expression),
            RangeSpec::AllTime => Ok(DateInterval::all_time()),
        }
    }

    fn category_names(
        &self,
        sections: &[ReportSection],
    ) -> TrackerResult<BTreeMap<CategoryId, String>> {
        let mut names = BTreeMap::new();
        let ids = sections
            .iter()
            .flat_map(|s| s.transactions.iter())
            .filter_map(|t| t.category_id);

        for id in ids {
            if names.contains_key(&id) {
                continue;
            }
            if let Some(category) = self.store.find_category(id)? {
                names.insert(id, category.name);
            }
        }
        Ok(names)
    }
}

fn period_label(unit: PeriodUnit, interval: &DateInterval) -> String {
    let start = interval.start();
    match unit {
        PeriodUnit::Day => start.format("%A, %B %d, %Y").to_string(),
        PeriodUnit::Week => format!(
            "Week of {} ({} to {})",
            start.format("%B %d, %Y"),
            start.format("%Y-%m-%d"),
            interval.end().format("%Y-%m-%d")
        ),
        PeriodUnit::Month => start.format("%B %Y").to_string(),
        PeriodUnit::Year => start.format("%Y").to_string(),
    }
}

/// Labelled totals for each slice of a period
fn breakdown_rows(
    unit: PeriodUnit,
    slices: Vec<DateInterval>,
    section: &ReportSection,
) -> Vec<BreakdownRow> {
    slices
        .into_iter()
        .enumerate()
        .map(|(i, interval)| {
            let label = match unit {
                PeriodUnit::Month => format!("Week {}", i + 1),
                PeriodUnit::Year => interval.start().format("%B").to_string(),
                PeriodUnit::Day | PeriodUnit::Week => interval.start().format("%A").to_string(),
            };
            let inside: Vec<Transaction> = section
                .transactions
                .iter()
                .filter(|t| interval.contains(t.date))
                .cloned()
                .collect();
            BreakdownRow {
                label,
                interval,
                totals: aggregate(&inside, GroupBy::None),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Money, TransactionKind};
    use crate::reports::aggregation::PercentChange;
    use std::cell::RefCell;

    /// In-memory store recording the queries it receives
    #[derive(Default)]
    struct FakeStore {
        transactions: Vec<Transaction>,
        categories: Vec<Category>,
        queries: RefCell<Vec<TransactionQuery>>,
    }

    impl TransactionStore for FakeStore {
        fn find_transactions(&self, query: &TransactionQuery) -> TrackerResult<Vec<Transaction>> {
            self.queries.borrow_mut().push(query.clone());
            Ok(self
                .transactions
                .iter()
                .filter(|t| query.matches(t))
                .cloned()
                .collect())
        }

        fn find_category(&self, id: CategoryId) -> TrackerResult<Option<Category>> {
            Ok(self.categories.iter().find(|c| c.id == id).cloned())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn money(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    fn clock() -> FixedClock {
        // A Wednesday
        FixedClock(day(2024, 1, 10))
    }

    fn sample_store() -> (FakeStore, Category) {
        let food = Category::new("Food & Dining", TransactionKind::Expense);
        let store = FakeStore {
            transactions: vec![
                Transaction::expense(money(1_250), day(2024, 1, 8)).with_category(food.id),
                Transaction::expense(money(3_000), day(2024, 1, 10)).with_category(food.id),
                Transaction::income(money(200_000), day(2024, 1, 1)),
                Transaction::expense(money(9_900), day(2023, 12, 24)).with_category(food.id),
                Transaction::expense(money(500), day(2024, 2, 2)),
            ],
            categories: vec![food.clone()],
            queries: RefCell::new(Vec::new()),
        };
        (store, food)
    }

    #[test]
    fn test_daily_report_defaults_to_today() {
        let (store, food) = sample_store();
        let clock = clock();
        let report = ReportBuilder::new(&store, &clock)
            .build(&ReportRequest::Daily { anchor: None })
            .unwrap();

        assert_eq!(report.kind, ReportKind::Daily);
        assert_eq!(report.generated_on, day(2024, 1, 10));
        let section = report.primary().unwrap();
        assert_eq!(section.interval, DateInterval::single_day(day(2024, 1, 10)));
        assert_eq!(section.aggregation.total_expense, money(3_000));
        assert_eq!(section.aggregation.group_by, GroupBy::Category);
        assert!(report.breakdown.is_empty());
        assert_eq!(report.key_label(&GroupKey::Category(food.id)), "Food & Dining");
        assert_eq!(store.queries.borrow().len(), 1);
    }

    #[test]
    fn test_weekly_report_breaks_down_by_day() {
        let (store, _) = sample_store();
        let clock = clock();
        let report = ReportBuilder::new(&store, &clock)
            .build(&ReportRequest::Weekly { anchor: None })
            .unwrap();

        let section = report.primary().unwrap();
        assert_eq!(
            section.interval,
            DateInterval::new(day(2024, 1, 8), day(2024, 1, 14)).unwrap()
        );
        assert_eq!(section.aggregation.count, 2);
        assert_eq!(report.breakdown.len(), 7);
        assert_eq!(report.breakdown[0].label, "Monday");
        assert_eq!(report.breakdown[0].totals.total_expense, money(1_250));
        assert_eq!(report.breakdown[2].totals.total_expense, money(3_000));
    }

    #[test]
    fn test_monthly_report_with_expression_anchor() {
        let (store, food) = sample_store();
        let clock = clock();
        let report = ReportBuilder::new(&store, &clock)
            .build(&ReportRequest::Monthly {
                anchor: Some("last month".into()),
            })
            .unwrap();

        let section = report.primary().unwrap();
        assert_eq!(section.label, "December 2023");
        assert_eq!(
            section.interval,
            DateInterval::new(day(2023, 12, 1), day(2023, 12, 31)).unwrap()
        );
        assert_eq!(section.aggregation.total_expense, money(9_900));
        assert_eq!(
            section
                .aggregation
                .group(&GroupKey::Category(food.id))
                .unwrap()
                .count,
            1
        );
        // 31 days: four full weeks and a 3-day tail
        assert_eq!(report.breakdown.len(), 5);
        assert_eq!(report.breakdown[3].totals.total_expense, money(9_900));
        assert_eq!(report.breakdown[4].interval.days(), 3);
    }

    #[test]
    fn test_yearly_report_breaks_down_by_month() {
        let (store, _) = sample_store();
        let clock = clock();
        let report = ReportBuilder::new(&store, &clock)
            .build(&ReportRequest::Yearly {
                anchor: Some(day(2024, 6, 1).into()),
            })
            .unwrap();

        let section = report.primary().unwrap();
        assert_eq!(section.aggregation.count, 4);
        assert_eq!(section.aggregation.net, money(200_000 - 1_250 - 3_000 - 500));
        assert_eq!(report.breakdown.len(), 12);
        assert_eq!(report.breakdown[0].label, "January");
        assert_eq!(report.breakdown[1].totals.total_expense, money(500));
    }

    #[test]
    fn test_category_report_groups_by_day() {
        let (store, food) = sample_store();
        let clock = clock();
        let report = ReportBuilder::new(&store, &clock)
            .build(&ReportRequest::Category {
                category_id: food.id,
                range: RangeSpec::bounds(day(2024, 1, 1), "2024-01-31"),
            })
            .unwrap();

        assert_eq!(report.category.as_ref().map(|c| c.id), Some(food.id));
        let section = report.primary().unwrap();
        assert_eq!(section.aggregation.group_by, GroupBy::Day);
        assert_eq!(section.aggregation.groups.len(), 2);
        assert_eq!(section.aggregation.total_expense, money(4_250));
        assert_eq!(store.queries.borrow()[0].category_id, Some(food.id));
    }

    #[test]
    fn test_category_report_all_time() {
        let (store, food) = sample_store();
        let clock = clock();
        let report = ReportBuilder::new(&store, &clock)
            .build(&ReportRequest::Category {
                category_id: food.id,
                range: RangeSpec::AllTime,
            })
            .unwrap();

        assert_eq!(report.primary().unwrap().aggregation.count, 3);
        assert!(report.primary().unwrap().interval.is_all_time());
    }

    #[test]
    fn test_unknown_category_fails_before_querying() {
        let (store, _) = sample_store();
        let clock = clock();
        let err = ReportBuilder::new(&store, &clock)
            .build(&ReportRequest::Category {
                category_id: CategoryId::new(),
                range: RangeSpec::AllTime,
            })
            .unwrap_err();

        assert!(matches!(err, TrackerError::CategoryNotFound(_)));
        assert!(store.queries.borrow().is_empty());
    }

    #[test]
    fn test_comparison_report() {
        let (store, _) = sample_store();
        let clock = clock();
        let report = ReportBuilder::new(&store, &clock)
            .build(&ReportRequest::Comparison {
                baseline: RangeSpec::Expression("last month".into()),
                comparand: RangeSpec::Expression("this month".into()),
            })
            .unwrap();

        assert_eq!(report.sections.len(), 2);
        let delta = report.comparison.unwrap();
        // -99.00 -> 2000.00 - 42.50
        assert_eq!(delta.net_change, money(195_750 + 9_900));
        assert_eq!(
            delta.percent_change,
            PercentChange::Defined(205_650.0 / -9_900.0 * 100.0)
        );
        assert_eq!(delta.income_percent_change, PercentChange::Undefined);
        assert_eq!(store.queries.borrow().len(), 2);
    }

    #[test]
    fn test_date_errors_propagate() {
        let (store, food) = sample_store();
        let clock = clock();
        let builder = ReportBuilder::new(&store, &clock);

        let err = builder
            .build(&ReportRequest::Monthly {
                anchor: Some("the other day".into()),
            })
            .unwrap_err();
        assert!(matches!(err, TrackerError::DateParse { ref input } if input == "the other day"));

        let err = builder
            .build(&ReportRequest::Category {
                category_id: food.id,
                range: RangeSpec::bounds("2024-02-01", "2024-01-01"),
            })
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidRange { .. }));

        let err = builder
            .build(&ReportRequest::Comparison {
                baseline: RangeSpec::Expression("last month".into()),
                comparand: RangeSpec::Expression("13/13/2023".into()),
            })
            .unwrap_err();
        assert!(err.is_date_error());
        assert!(store.queries.borrow().is_empty());
    }

    #[test]
    fn test_request_serializes_with_kind_tag() {
        let request = ReportRequest::Weekly {
            anchor: Some("yesterday".into()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "weekly");
        assert_eq!(request.kind(), ReportKind::Weekly);
    }
}
