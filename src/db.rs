//! Database initialization.

use rusqlite::Connection;

use crate::{
    Error,
    category::{create_category_table, seed_categories},
    transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for the domain models and seed the default categories.
///
/// Existing tables and categories are left untouched, so this is safe to call on every start up.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign keys cannot be switched on inside a transaction.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    seed_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();
        initialize(&conn).unwrap();

        let category_count: i64 = conn
            .query_row("SELECT COUNT(id) FROM category", [], |row| row.get(0))
            .unwrap();
        assert_eq!(category_count, 15);
    }

    #[test]
    fn enables_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();

        let foreign_keys: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }
}
