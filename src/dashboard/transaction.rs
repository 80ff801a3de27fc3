//! The transactions the monthly report is built from, and where they come from.
//!
//! This module provides a transaction view with its category already resolved, since the report
//! only needs the date, amount, kind and category name of each transaction.

use std::ops::Range;

use rusqlite::{Connection, Row};
use time::Date;

use crate::{Error, category::Category, transaction::TransactionKind, user::UserId};

/// The name shown for expenses that have no category.
pub const UNCATEGORIZED_LABEL: &str = "未分類";

/// A transaction with its category resolved, as consumed by the report builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// When the transaction happened.
    pub date: Date,
    /// The amount of money in the minor currency unit.
    pub amount: u32,
    /// Whether the money was spent or earned.
    pub kind: TransactionKind,
    /// The category the transaction is filed under, if any.
    pub category: Option<Category>,
}

impl Transaction {
    /// The category's name, or [UNCATEGORIZED_LABEL] if the transaction has no category.
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map_or(UNCATEGORIZED_LABEL, |category| category.name.as_str())
    }
}

/// Somewhere the transactions of one user can be fetched from.
pub trait TransactionSource {
    /// Get the transactions owned by `owner_id` with a date in the half-open range `date_range`.
    ///
    /// Implementers should return the transactions in a stable order, since the order decides
    /// how categories with equal totals are ranked.
    fn fetch_transactions(
        &self,
        owner_id: UserId,
        date_range: Range<Date>,
    ) -> Result<Vec<Transaction>, Error>;
}

impl TransactionSource for Connection {
    /// Transactions are returned in the order they were recorded.
    fn fetch_transactions(
        &self,
        owner_id: UserId,
        date_range: Range<Date>,
    ) -> Result<Vec<Transaction>, Error> {
        self.prepare(
            "SELECT t.date, t.amount, t.kind, c.id, c.kind, c.name
            FROM \"transaction\" t
            LEFT JOIN category c ON c.id = t.category_id
            WHERE t.user_id = ?1 AND t.date >= ?2 AND t.date < ?3
            ORDER BY t.id ASC",
        )?
        .query_map(
            (owner_id.as_i64(), date_range.start, date_range.end),
            map_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
    }
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let category_id: Option<i64> = row.get(3)?;
    let category = match category_id {
        Some(id) => Some(Category {
            id,
            kind: row.get(4)?,
            name: row.get(5)?,
        }),
        None => None,
    };

    Ok(Transaction {
        date: row.get(0)?,
        amount: row.get(1)?,
        kind: row.get(2)?,
        category,
    })
}
