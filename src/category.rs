//! Categories are the static, shared buckets that transactions are filed under, e.g. "食費" (food).
//!
//! Categories are seeded once when the database is initialized and are read-only afterwards.
//! Expense and income categories are disjoint sets.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::CategoryId, transaction::TransactionKind};

/// The expense categories created on first start up, in display order.
const EXPENSE_CATEGORY_NAMES: [&str; 12] = [
    "食費",
    "住居",
    "光熱費",
    "通信",
    "交通",
    "教養娯楽",
    "日用品",
    "医療",
    "交際費",
    "特別費",
    "税金",
    "その他",
];

/// The income categories created on first start up, in display order.
const INCOME_CATEGORY_NAMES: [&str; 3] = ["給与", "副収入", "賞与"];

/// A named bucket for transactions of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// Whether the category is for expenses or income.
    pub kind: TransactionKind,
    /// The display name of the category.
    pub name: String,
}

/// Create the category table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
            name TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert the default categories if the category table is empty.
///
/// Calling this function more than once will not create duplicate categories.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn seed_categories(connection: &Connection) -> Result<(), Error> {
    let is_seeded: bool = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM category)",
        [],
        |row| row.get(0),
    )?;

    if is_seeded {
        return Ok(());
    }

    let mut statement = connection.prepare("INSERT INTO category (kind, name) VALUES (?1, ?2)")?;

    for name in EXPENSE_CATEGORY_NAMES {
        statement.execute((TransactionKind::Expense, name))?;
    }

    for name in INCOME_CATEGORY_NAMES {
        statement.execute((TransactionKind::Income, name))?;
    }

    tracing::debug!(
        "Seeded {} categories",
        EXPENSE_CATEGORY_NAMES.len() + INCOME_CATEGORY_NAMES.len()
    );

    Ok(())
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns an [Error::NotFound] if `category_id` does not refer to a category.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, kind, name FROM category WHERE id = :id")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories, income categories first, then ordered by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, kind, name FROM category ORDER BY kind DESC, name ASC")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        kind: row.get(1)?,
        name: row.get(2)?,
    })
}

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists every category.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))
        .map(Json)
}

#[cfg(test)]
mod category_tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;

    use crate::{Error, test_utils::get_test_connection, transaction::TransactionKind};

    use super::{
        CategoryState, EXPENSE_CATEGORY_NAMES, INCOME_CATEGORY_NAMES, create_category_table,
        get_all_categories, get_categories_endpoint, get_category, seed_categories,
    };

    #[test]
    fn seeds_default_categories() {
        let conn = get_test_connection();

        let categories = get_all_categories(&conn).unwrap();

        assert_eq!(
            categories.len(),
            EXPENSE_CATEGORY_NAMES.len() + INCOME_CATEGORY_NAMES.len()
        );
        let expense_count = categories
            .iter()
            .filter(|category| category.kind == TransactionKind::Expense)
            .count();
        assert_eq!(expense_count, EXPENSE_CATEGORY_NAMES.len());
        assert!(categories.iter().any(|category| category.name == "食費"));
        assert!(categories.iter().any(|category| category.name == "給与"));
    }

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let conn = get_test_connection();
        seed_categories(&conn).unwrap();
        seed_categories(&conn).unwrap();

        let categories = get_all_categories(&conn).unwrap();

        assert_eq!(
            categories.len(),
            EXPENSE_CATEGORY_NAMES.len() + INCOME_CATEGORY_NAMES.len()
        );
    }

    #[test]
    fn lists_income_categories_first() {
        let conn = get_test_connection();

        let kinds: Vec<_> = get_all_categories(&conn)
            .unwrap()
            .into_iter()
            .map(|category| category.kind)
            .collect();

        let mut want = kinds.clone();
        want.sort_by_key(|kind| *kind == TransactionKind::Expense);
        assert_eq!(kinds, want);
    }

    #[test]
    fn get_category_by_id() {
        let conn = get_test_connection();
        let want = get_all_categories(&conn).unwrap().remove(3);

        let got = get_category(want.id, &conn);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn get_missing_category_fails() {
        let conn = Connection::open_in_memory().unwrap();
        create_category_table(&conn).unwrap();

        assert_eq!(get_category(1, &conn), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn endpoint_lists_categories() {
        let conn = get_test_connection();
        let want = get_all_categories(&conn).unwrap();
        let state = CategoryState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let got = get_categories_endpoint(State(state)).await.unwrap();

        assert_eq!(got.0, want);
    }
}
