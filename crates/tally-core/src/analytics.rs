//! Aggregation engine
//!
//! Pure transforms from store rows to the derived report types. Nothing in
//! here touches the database; `db::reports` fetches the rows and hands them
//! over, which keeps the grouping, sorting, and rounding rules testable on
//! plain vectors.

use std::cmp::Ordering;

use chrono::{Datelike, Months, NaiveDate};

use crate::models::{
    Budget, Category, CategoryAmount, CategoryBreakdown, CategoryBreakdownReport, CategoryTotalRow,
    DateRange, Insight, InsightStatus, MonthTotalRow, MonthlyExpense,
};

/// Month names indexed by calendar month; index 0 is unused
pub const MONTH_NAMES: [&str; 13] = [
    "", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Spending below this share of the budget counts as "under"
const UNDER_BUDGET_MARGIN: f64 = 0.2;

/// Round to 2 decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Short month name for a 1-based month, empty for anything out of range
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES.get(month as usize).copied().unwrap_or("")
}

/// First and last day of the month containing `day`
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (first, last)
}

/// Date range covering the calendar month containing `day`
pub fn current_month_range(day: NaiveDate) -> DateRange {
    let (first, last) = month_bounds(day);
    DateRange::between(first, last)
}

/// Range [today - months_back months, today]
///
/// Subtracting months clamps to the end of shorter months (Mar 31 minus one
/// month is the last day of February).
pub fn months_back_range(today: NaiveDate, months_back: u32) -> DateRange {
    let start = today
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(NaiveDate::MIN);
    DateRange::between(start, today)
}

fn by_total_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Turn per-category totals into a breakdown with averages and shares
///
/// Rows are ordered by total descending. The sort is stable, so categories
/// with equal totals keep the order the store returned them in.
pub fn build_category_breakdown(rows: Vec<CategoryTotalRow>) -> CategoryBreakdownReport {
    let mut rows = rows;
    rows.sort_by(|a, b| by_total_desc(a.total, b.total));

    let total: f64 = rows.iter().map(|r| r.total).sum();

    let categories = rows
        .into_iter()
        .map(|row| {
            let avg = if row.count > 0 {
                row.total / row.count as f64
            } else {
                0.0
            };
            let percentage = if total > 0.0 {
                round2(row.total / total * 100.0)
            } else {
                0.0
            };
            CategoryBreakdown {
                category: row.category,
                total_amount: row.total,
                transaction_count: row.count,
                avg_amount: round2(avg),
                percentage,
            }
        })
        .collect();

    CategoryBreakdownReport { categories, total }
}

/// Turn per-month totals into chronologically ordered trend rows
pub fn build_monthly_expenses(rows: Vec<MonthTotalRow>) -> Vec<MonthlyExpense> {
    let mut rows = rows;
    rows.sort_by_key(|r| (r.year, r.month));

    rows.into_iter()
        .map(|row| MonthlyExpense {
            year: row.year,
            month: row.month,
            month_name: month_name(row.month).to_string(),
            total_expenses: row.total,
            transaction_count: row.count,
        })
        .collect()
}

/// Per-category totals, largest first
pub fn category_totals(rows: &[CategoryTotalRow]) -> Vec<CategoryAmount> {
    let mut totals: Vec<CategoryAmount> = rows
        .iter()
        .map(|row| CategoryAmount {
            category: row.category,
            amount: row.total,
        })
        .collect();
    totals.sort_by(|a, b| by_total_desc(a.amount, b.amount));
    totals
}

/// Highest-spending category
///
/// Ties resolve to whichever category the store returned first; this is not
/// stable across storage engines.
pub fn top_category(totals: &[CategoryAmount]) -> Option<CategoryAmount> {
    totals
        .iter()
        .fold(None::<&CategoryAmount>, |best, candidate| match best {
            Some(current) if current.amount >= candidate.amount => Some(current),
            _ => Some(candidate),
        })
        .cloned()
}

/// Classify spending against a budget
pub fn insight_status(budget: f64, actual: f64) -> InsightStatus {
    let difference = actual - budget;
    if difference > 0.0 {
        InsightStatus::Over
    } else if difference < -UNDER_BUDGET_MARGIN * budget {
        InsightStatus::Under
    } else {
        InsightStatus::Good
    }
}

/// Compare one category's budget against what was actually spent
pub fn insight_for(category: Category, budget: f64, actual: f64) -> Insight {
    let percentage = if budget > 0.0 {
        actual / budget * 100.0
    } else {
        0.0
    };
    Insight {
        category,
        budget,
        actual,
        difference: actual - budget,
        percentage,
        status: insight_status(budget, actual),
    }
}

/// One insight per budget row, in budget order
///
/// Categories with a budget but no spending get `actual = 0`.
pub fn build_insights(budgets: &[Budget], breakdown: &CategoryBreakdownReport) -> Vec<Insight> {
    budgets
        .iter()
        .map(|budget| {
            let actual = breakdown
                .categories
                .iter()
                .find(|c| c.category == budget.category)
                .map(|c| c.total_amount)
                .unwrap_or(0.0);
            insight_for(budget.category, budget.amount, actual)
        })
        .collect()
}
