//! Assembles the monthly report shown on the dashboard.
//!
//! The report builder is pure: it takes one month of transactions and derives every figure the
//! dashboard needs from them. [fetch_monthly_report] is the glue that loads those transactions
//! from a [TransactionSource] first.

use serde::Serialize;
use time::Weekday;

use crate::{
    Error,
    dashboard::{
        aggregation::{
            CategoryTotal, DailySeries, Totals, aggregate_totals, build_daily_series,
            group_expenses_by_category,
        },
        calendar::{CalendarWeek, build_calendar_weeks},
        month::{MonthSelector, compute_month_bounds},
        transaction::{Transaction, TransactionSource},
    },
    user::UserId,
};

/// Everything the dashboard shows for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    /// The year of the report.
    pub year: i32,
    /// The month number of the report in `1..=12`.
    pub month: u8,
    /// The month formatted for display, e.g. "2025年09月".
    pub month_label: String,
    /// The year of the previous month.
    pub prev_year: i32,
    /// The previous month number.
    pub prev_month: u8,
    /// The year of the following month.
    pub next_year: i32,
    /// The following month number.
    pub next_month: u8,
    /// The number of days in the month.
    pub days_in_month: u8,
    /// The income, expenses and balance of the whole month.
    pub totals: Totals,
    /// Expenses per category, largest first.
    pub categories: Vec<CategoryTotal>,
    /// Income, expenses and balance per day.
    pub daily: DailySeries,
    /// The calendar layout of the month.
    pub weeks: Vec<CalendarWeek>,
    /// The category names of `categories`, for the category chart.
    pub category_labels: Vec<String>,
    /// The totals of `categories`, for the category chart.
    pub category_values: Vec<i64>,
    /// The day labels for the daily chart, e.g. "1日".
    pub day_labels: Vec<String>,
    /// The daily expenses, for the daily chart.
    pub day_values: Vec<i64>,
}

/// Builds the report for `month` of `year` from that month's transactions.
///
/// `first_day_of_week` decides which column the calendar starts on.
///
/// # Errors
/// Returns an:
/// - [Error::InvalidMonth] if `month` is not in `1..=12`,
/// - [Error::InvalidYear] if the month cannot be represented as a date,
/// - [Error::TransactionOutsideMonth] if any transaction is dated outside the month.
pub fn build_monthly_report(
    transactions: &[Transaction],
    year: i32,
    month: u8,
    first_day_of_week: Weekday,
) -> Result<MonthlyReport, Error> {
    let bounds = compute_month_bounds(year, month)?;

    if let Some(stray) = transactions
        .iter()
        .find(|transaction| !bounds.contains(transaction.date))
    {
        return Err(Error::TransactionOutsideMonth(stray.date));
    }

    let totals = aggregate_totals(transactions);
    let categories = group_expenses_by_category(transactions);
    let daily = build_daily_series(transactions, bounds.days_in_month);
    let weeks = build_calendar_weeks(year, month, first_day_of_week)?;

    let category_labels = categories.iter().map(|row| row.name.clone()).collect();
    let category_values = categories.iter().map(|row| row.total).collect();
    let day_labels = (1..=bounds.days_in_month)
        .map(|day| format!("{day}日"))
        .collect();
    let day_values = daily.expense.clone();

    Ok(MonthlyReport {
        year,
        month,
        month_label: format_month_label(year, month),
        prev_year: bounds.prev_year,
        prev_month: bounds.prev_month,
        next_year: bounds.next_year,
        next_month: bounds.next_month,
        days_in_month: bounds.days_in_month,
        totals,
        categories,
        daily,
        weeks,
        category_labels,
        category_values,
        day_labels,
        day_values,
    })
}

/// Loads the transactions of `owner_id` for the selected month and builds its report.
///
/// # Errors
/// Returns any error from [TransactionSource::fetch_transactions] or [build_monthly_report].
pub fn fetch_monthly_report(
    owner_id: UserId,
    selector: MonthSelector,
    first_day_of_week: Weekday,
    source: &impl TransactionSource,
) -> Result<MonthlyReport, Error> {
    let bounds = compute_month_bounds(selector.year, selector.month)?;

    let transactions =
        source.fetch_transactions(owner_id, bounds.month_start..bounds.next_month_start)?;

    let report = build_monthly_report(
        &transactions,
        selector.year,
        selector.month,
        first_day_of_week,
    )?;

    tracing::debug!(
        "Built report for user {owner_id} in {}: {} transactions, {} categories",
        report.month_label,
        transactions.len(),
        report.categories.len()
    );

    Ok(report)
}

fn format_month_label(year: i32, month: u8) -> String {
    format!("{year:04}年{month:02}月")
}
