#![allow(missing_docs)]

use rusqlite::Connection;

use crate::{
    db::initialize,
    user::{User, create_user},
};

/// An in-memory database with every table created and the categories seeded.
pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&conn).expect("Could not initialize database.");
    conn
}

#[track_caller]
pub(crate) fn create_test_user(connection: &Connection, username: &str) -> User {
    create_user(username, connection).expect("Could not create test user.")
}
