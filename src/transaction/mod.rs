//! Transaction management for the household budget.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing a user's transactions
//! - JSON endpoints for the transaction routes

mod core;
mod endpoints;

pub use self::core::{
    Transaction, TransactionBuilder, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, get_transactions,
    update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
    get_transaction_endpoint, get_transactions_endpoint,
};
