//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was spent or earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money was spent.
    Expense,
    /// Money was earned.
    Income,
}

impl TransactionKind {
    /// The name used for the kind in the database and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(Error::InvalidTransactionKind(other.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// A transaction belongs to exactly one user and is never visible to other users.
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub owner_id: UserId,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money in the minor currency unit, e.g. yen.
    pub amount: u32,
    /// Whether the money was spent or earned.
    pub kind: TransactionKind,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: u32,
        kind: TransactionKind,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            date,
            description: description.to_owned(),
            amount,
            kind,
            category_id: None,
        }
    }
}

/// The user supplied fields of a [Transaction].
///
/// Doubles as the JSON body for creating and editing transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBuilder {
    /// The date when the transaction occurred.
    pub date: Date,

    /// A human-readable description of the transaction, e.g. "スーパー" or "Rent".
    ///
    /// Leading and trailing whitespace is removed before the transaction is saved.
    pub description: String,

    /// The amount of money in the minor currency unit.
    ///
    /// Whether this is money in or out is given by `kind`, so the amount is never negative.
    pub amount: u32,

    /// Whether the money was spent or earned.
    pub kind: TransactionKind,

    /// The category of the transaction, e.g. "食費" (food) or "給与" (salary).
    ///
    /// The category's kind should match `kind`. The request handlers check this before saving.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the category ID for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str =
    "id, user_id, date, description, amount, kind, category_id, created_at";

/// Create a new transaction owned by `owner_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - [Error::NotFound] if `owner_id` does not refer to a real user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    owner_id: UserId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = builder.category_id;

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, date, description, amount, kind, category_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                owner_id.as_i64(),
                builder.date,
                builder.description.trim(),
                builder.amount,
                builder.kind,
                builder.category_id,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )
        .map_err(|error| map_foreign_key_error(error, category_id))
}

/// Retrieve the transaction `id` owned by `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `owner_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    owner_id: UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, owner_id.as_i64()), map_transaction_row)
        .map_err(|error| error.into())
}

/// Retrieve all transactions owned by `owner_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_transactions(
    owner_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\"
             WHERE user_id = ?1
             ORDER BY date DESC, id DESC"
        ))?
        .query_map((owner_id.as_i64(),), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Replace the user supplied fields of the transaction `id` owned by `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `owner_id`,
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    owner_id: UserId,
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = builder.category_id;

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\"
             SET date = ?1, description = ?2, amount = ?3, kind = ?4, category_id = ?5
             WHERE id = ?6 AND user_id = ?7",
            (
                builder.date,
                builder.description.trim(),
                builder.amount,
                builder.kind,
                builder.category_id,
                id,
                owner_id.as_i64(),
            ),
        )
        .map_err(|error| map_foreign_key_error(error, category_id))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    get_transaction(owner_id, id, connection)
}

/// Delete the transaction `id` owned by `owner_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `owner_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    owner_id: UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, owner_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
                category_id INTEGER,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        owner_id: UserId::new(row.get(1)?),
        date: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        kind: row.get(5)?,
        category_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// The owner is checked by the request handlers before any write, so a failed foreign key
/// with a category set is blamed on the category.
fn map_foreign_key_error(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => match category_id {
            Some(_) => Error::InvalidCategory(category_id),
            None => Error::NotFound,
        },
        error => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod transaction_kind_tests {
    use crate::Error;

    use super::TransactionKind;

    #[test]
    fn parses_known_kinds() {
        assert_eq!("expense".parse(), Ok(TransactionKind::Expense));
        assert_eq!("income".parse(), Ok(TransactionKind::Income));
    }

    #[test]
    fn rejects_unknown_kind() {
        assert_eq!(
            "refund".parse::<TransactionKind>(),
            Err(Error::InvalidTransactionKind("refund".to_owned()))
        );
    }

    #[test]
    fn serializes_as_lowercase_string() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Income).unwrap(),
            "\"income\""
        );
    }
}
