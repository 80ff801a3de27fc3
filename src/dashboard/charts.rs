//! Chart generation for the dashboard.
//!
//! This module creates ECharts options for the monthly report:
//! - **Category Chart**: A pie chart of the month's expenses by category
//! - **Daily Expenses Chart**: A bar chart of the expenses on each day of the month
//!
//! The options are serialized to JSON strings so that the client can pass them straight to
//! `echarts.setOption`.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::{Pie, bar},
};
use serde::Serialize;

use crate::dashboard::report::MonthlyReport;

/// A dashboard chart with its HTML container ID and ECharts configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Creates the options for every chart on the dashboard.
pub fn dashboard_charts(report: &MonthlyReport) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "category-chart",
            options: category_chart(report).to_string(),
        },
        DashboardChart {
            id: "daily-expenses-chart",
            options: daily_expenses_chart(report).to_string(),
        },
    ]
}

fn category_chart(report: &MonthlyReport) -> Chart {
    let data: Vec<(f64, String)> = report
        .category_values
        .iter()
        .zip(&report.category_labels)
        .map(|(&total, name)| (total as f64, name.clone()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("カテゴリ別支出")
                .subtext(report.month_label.as_str()),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name("支出")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

fn daily_expenses_chart(report: &MonthlyReport) -> Chart {
    let values: Vec<f64> = report
        .day_values
        .iter()
        .map(|&amount| amount as f64)
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("日別支出")
                .subtext(report.month_label.as_str()),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(report.day_labels.clone()),
        )
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(bar::Bar::new().name("支出").data(values))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use time::{Weekday, macros::date};

    use crate::{
        category::Category,
        dashboard::{
            report::{MonthlyReport, build_monthly_report},
            transaction::Transaction,
        },
        transaction::TransactionKind,
    };

    use super::dashboard_charts;

    fn sample_report() -> MonthlyReport {
        let transactions = vec![
            Transaction {
                date: date!(2025 - 09 - 03),
                amount: 1200,
                kind: TransactionKind::Expense,
                category: Some(Category {
                    id: 1,
                    kind: TransactionKind::Expense,
                    name: "食費".to_owned(),
                }),
            },
            Transaction {
                date: date!(2025 - 09 - 10),
                amount: 300,
                kind: TransactionKind::Expense,
                category: None,
            },
        ];

        build_monthly_report(&transactions, 2025, 9, Weekday::Sunday).unwrap()
    }

    #[test]
    fn chart_options_are_valid_json() {
        for chart in dashboard_charts(&sample_report()) {
            let options: Result<Value, _> = serde_json::from_str(&chart.options);

            assert!(
                options.is_ok(),
                "options for {} should be JSON, got {}",
                chart.id,
                chart.options
            );
        }
    }

    #[test]
    fn category_chart_lists_categories() {
        let [category_chart, _] = dashboard_charts(&sample_report());

        assert_eq!(category_chart.id, "category-chart");
        assert!(category_chart.options.contains("食費"));
        assert!(category_chart.options.contains("未分類"));
    }

    #[test]
    fn daily_chart_has_a_label_per_day() {
        let [_, daily_chart] = dashboard_charts(&sample_report());
        let options: Value = serde_json::from_str(&daily_chart.options).unwrap();

        let labels = options["xAxis"]
            .as_array()
            .and_then(|axes| axes.first())
            .or(Some(&options["xAxis"]))
            .and_then(|axis| axis["data"].as_array())
            .map(|labels| labels.len());

        assert_eq!(labels, Some(30));
    }
}
