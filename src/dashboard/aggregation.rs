//! Transaction data aggregation for the monthly report.
//!
//! Provides functions to total a month's income and expenses, rank expenses by category, and
//! bucket transactions by day of the month.

use std::collections::HashMap;

use serde::Serialize;

use crate::{dashboard::transaction::Transaction, transaction::TransactionKind};

/// The income, expenses and balance of a set of transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// The sum of all income.
    pub income: i64,
    /// The sum of all expenses.
    pub expense: i64,
    /// Income minus expenses.
    pub balance: i64,
}

/// Sums income and expenses.
///
/// # Returns
/// All zero totals for an empty slice.
pub fn aggregate_totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => totals.income += i64::from(transaction.amount),
            TransactionKind::Expense => totals.expense += i64::from(transaction.amount),
        }
    }

    totals.balance = totals.income - totals.expense;
    totals
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// The category's name, or the uncategorized label.
    pub name: String,
    /// The sum of the expenses in the category.
    pub total: i64,
}

/// Groups expenses by category name and ranks the categories by total, largest first.
///
/// Income is ignored. Categories with equal totals keep the order in which they first appear in
/// `transactions`.
pub fn group_expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut rows: Vec<CategoryTotal> = Vec::new();
    let mut row_index: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
    {
        let name = transaction.category_name();
        let index = *row_index.entry(name).or_insert_with(|| {
            rows.push(CategoryTotal {
                name: name.to_owned(),
                total: 0,
            });
            rows.len() - 1
        });

        rows[index].total += i64::from(transaction.amount);
    }

    // `sort_by` is stable, which keeps ties in first-seen order.
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Income, expenses and balance for each day of a month.
///
/// Index 0 holds day 1. Each vector has exactly as many entries as the month has days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySeries {
    /// The income for each day.
    pub income: Vec<i64>,
    /// The expenses for each day.
    pub expense: Vec<i64>,
    /// Income minus expenses for each day.
    pub balance: Vec<i64>,
}

#[cfg(test)]
impl DailySeries {
    /// The number of days in the series.
    pub fn len(&self) -> usize {
        self.income.len()
    }

    /// Whether the series has no days.
    pub fn is_empty(&self) -> bool {
        self.income.is_empty()
    }

    /// The income, expenses and balance of `day`, counting from 1.
    ///
    /// Returns `None` if the month has no such day.
    pub fn on_day(&self, day: u8) -> Option<Totals> {
        let index = usize::from(day).checked_sub(1)?;

        Some(Totals {
            income: *self.income.get(index)?,
            expense: *self.expense.get(index)?,
            balance: *self.balance.get(index)?,
        })
    }
}

/// Buckets transactions by their day of the month.
///
/// Transactions dated past `days_in_month` do not belong to the month and are skipped.
pub fn build_daily_series(transactions: &[Transaction], days_in_month: u8) -> DailySeries {
    let days = usize::from(days_in_month);
    let mut income = vec![0; days];
    let mut expense = vec![0; days];

    for transaction in transactions {
        let index = usize::from(transaction.date.day()) - 1;

        let bucket = match transaction.kind {
            TransactionKind::Income => income.get_mut(index),
            TransactionKind::Expense => expense.get_mut(index),
        };

        match bucket {
            Some(total) => *total += i64::from(transaction.amount),
            None => tracing::warn!(
                "Skipping transaction dated {} in a month with {days_in_month} days",
                transaction.date
            ),
        }
    }

    let balance = income
        .iter()
        .zip(&expense)
        .map(|(income, expense)| income - expense)
        .collect();

    DailySeries {
        income,
        expense,
        balance,
    }
}
