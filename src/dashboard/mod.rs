//! Dashboard module
//!
//! Builds the monthly report: totals, the expense breakdown by category, per-day series, the
//! calendar layout and month navigation. The report and its chart options are served as JSON.

mod aggregation;
mod calendar;
mod charts;
mod handlers;
mod month;
mod report;
mod transaction;

pub use aggregation::{
    CategoryTotal, DailySeries, Totals, aggregate_totals, build_daily_series,
    group_expenses_by_category,
};
pub use calendar::{CalendarWeek, build_calendar_weeks};
pub use charts::{DashboardChart, dashboard_charts};
pub use handlers::{get_dashboard, get_dashboard_charts};
pub use month::{MonthBounds, MonthQuery, MonthSelector, compute_month_bounds};
pub use report::{MonthlyReport, build_monthly_report, fetch_monthly_report};
pub use transaction::{Transaction, TransactionSource, UNCATEGORIZED_LABEL};
