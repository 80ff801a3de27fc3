//! JSON endpoints for recording, listing, editing and deleting a user's transactions.
//!
//! Every endpoint is scoped to the user in the path. A transaction that belongs to somebody else
//! is reported the same way as one that does not exist.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::get_category,
    database_id::TransactionId,
    transaction::{
        Transaction, TransactionBuilder, create_transaction, delete_transaction, get_transaction,
        get_transactions, update_transaction,
    },
    user::{UserId, get_user_by_id},
};

/// The state needed to manage transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

impl TransactionState {
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

/// A route handler for recording a new transaction, responds with the saved transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(user_id): Path<UserId>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state.lock()?;

    get_user_by_id(user_id, &connection)?;
    check_category(&builder, &connection)?;

    let transaction = create_transaction(user_id, builder, &connection)
        .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for listing a user's transactions, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state.lock()?;

    get_user_by_id(user_id, &connection)?;

    get_transactions(user_id, &connection).map(Json)
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path((user_id, transaction_id)): Path<(UserId, TransactionId)>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.lock()?;

    get_transaction(user_id, transaction_id, &connection).map(Json)
}

/// A route handler for replacing the fields of a transaction, responds with the saved transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Path((user_id, transaction_id)): Path<(UserId, TransactionId)>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.lock()?;

    check_category(&builder, &connection)?;

    update_transaction(user_id, transaction_id, builder, &connection)
        .inspect_err(|error| {
            tracing::error!("could not update transaction {transaction_id}: {error}")
        })
        .map(Json)
}

/// Checks that the category of `builder`, if set, exists and is for the same kind of transaction.
fn check_category(builder: &TransactionBuilder, connection: &Connection) -> Result<(), Error> {
    let Some(category_id) = builder.category_id else {
        return Ok(());
    };

    match get_category(category_id, connection) {
        Ok(category) if category.kind == builder.kind => Ok(()),
        Ok(_) | Err(Error::NotFound) => Err(Error::InvalidCategory(builder.category_id)),
        Err(error) => Err(error),
    }
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path((user_id, transaction_id)): Path<(UserId, TransactionId)>,
) -> Result<StatusCode, Error> {
    let connection = state.lock()?;

    delete_transaction(user_id, transaction_id, &connection)
        .inspect_err(|error| {
            tracing::error!("could not delete transaction {transaction_id}: {error}")
        })?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, get_all_categories},
        test_utils::{create_test_user, get_test_connection},
        transaction::{Transaction, TransactionBuilder, TransactionKind, get_transaction},
        user::UserId,
    };

    use super::{
        TransactionState, create_transaction_endpoint, delete_transaction_endpoint,
        edit_transaction_endpoint, get_transaction_endpoint, get_transactions_endpoint,
    };

    fn lunch() -> TransactionBuilder {
        Transaction::build(
            980,
            TransactionKind::Expense,
            date!(2025 - 09 - 12),
            "ランチ",
        )
    }

    fn first_category_of_kind(state: &TransactionState, kind: TransactionKind) -> Category {
        let connection = state.db_connection.lock().unwrap();

        get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .find(|category| category.kind == kind)
            .unwrap()
    }

    fn test_state() -> (TransactionState, UserId) {
        let conn = get_test_connection();
        let owner = create_test_user(&conn, "hanako");

        (
            TransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            owner.id,
        )
    }

    #[tokio::test]
    async fn create_returns_created_transaction() {
        let (state, owner_id) = test_state();

        let (status, Json(transaction)) =
            create_transaction_endpoint(State(state.clone()), Path(owner_id), Json(lunch()))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(transaction.owner_id, owner_id);
        assert_eq!(transaction.amount, 980);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(owner_id, transaction.id, &connection),
            Ok(transaction)
        );
    }

    #[tokio::test]
    async fn create_for_unknown_user_is_not_found() {
        let (state, _) = test_state();

        let result =
            create_transaction_endpoint(State(state), Path(UserId::new(999)), Json(lunch())).await;

        assert_eq!(result.map(|(_, json)| json.0), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn list_returns_own_transactions() {
        let (state, owner_id) = test_state();
        create_transaction_endpoint(State(state.clone()), Path(owner_id), Json(lunch()))
            .await
            .unwrap();

        let Json(transactions) = get_transactions_endpoint(State(state), Path(owner_id))
            .await
            .unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].description, "ランチ");
    }

    #[tokio::test]
    async fn get_hides_other_users_transactions() {
        let (state, owner_id) = test_state();
        let stranger_id = {
            let connection = state.db_connection.lock().unwrap();
            create_test_user(&connection, "taro").id
        };
        let (_, Json(transaction)) =
            create_transaction_endpoint(State(state.clone()), Path(owner_id), Json(lunch()))
                .await
                .unwrap();

        let result =
            get_transaction_endpoint(State(state), Path((stranger_id, transaction.id))).await;

        assert_eq!(result.map(|json| json.0), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn edit_replaces_fields() {
        let (state, owner_id) = test_state();
        let (_, Json(transaction)) =
            create_transaction_endpoint(State(state.clone()), Path(owner_id), Json(lunch()))
                .await
                .unwrap();

        let Json(edited) = edit_transaction_endpoint(
            State(state),
            Path((owner_id, transaction.id)),
            Json(Transaction::build(
                1500,
                TransactionKind::Expense,
                date!(2025 - 09 - 13),
                "ディナー",
            )),
        )
        .await
        .unwrap();

        assert_eq!(edited.id, transaction.id);
        assert_eq!(edited.amount, 1500);
        assert_eq!(edited.description, "ディナー");
    }

    #[tokio::test]
    async fn edit_missing_transaction_fails() {
        let (state, owner_id) = test_state();

        let result =
            edit_transaction_endpoint(State(state), Path((owner_id, 1234)), Json(lunch())).await;

        assert_eq!(
            result.map(|json| json.0),
            Err(Error::UpdateMissingTransaction)
        );
    }

    #[tokio::test]
    async fn delete_removes_transaction() {
        let (state, owner_id) = test_state();
        let (_, Json(transaction)) =
            create_transaction_endpoint(State(state.clone()), Path(owner_id), Json(lunch()))
                .await
                .unwrap();

        let status =
            delete_transaction_endpoint(State(state.clone()), Path((owner_id, transaction.id)))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            delete_transaction_endpoint(State(state), Path((owner_id, transaction.id))).await,
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[tokio::test]
    async fn create_with_matching_category_succeeds() {
        let (state, owner_id) = test_state();
        let food = first_category_of_kind(&state, TransactionKind::Expense);

        let (_, Json(transaction)) = create_transaction_endpoint(
            State(state),
            Path(owner_id),
            Json(lunch().category_id(Some(food.id))),
        )
        .await
        .unwrap();

        assert_eq!(transaction.category_id, Some(food.id));
    }

    #[tokio::test]
    async fn create_with_unknown_category_fails() {
        let (state, owner_id) = test_state();
        let body = lunch().category_id(Some(4242));

        let result = create_transaction_endpoint(State(state), Path(owner_id), Json(body)).await;

        assert_eq!(
            result.map(|(_, json)| json.0),
            Err(Error::InvalidCategory(Some(4242)))
        );
    }

    #[tokio::test]
    async fn create_with_category_of_other_kind_fails() {
        let (state, owner_id) = test_state();
        let salary = first_category_of_kind(&state, TransactionKind::Income);
        let body = lunch().category_id(Some(salary.id));

        let result =
            create_transaction_endpoint(State(state.clone()), Path(owner_id), Json(body)).await;

        assert_eq!(
            result.map(|(_, json)| json.0),
            Err(Error::InvalidCategory(Some(salary.id)))
        );
        let Json(transactions) = get_transactions_endpoint(State(state), Path(owner_id))
            .await
            .unwrap();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn edit_with_category_of_other_kind_fails() {
        let (state, owner_id) = test_state();
        let salary = first_category_of_kind(&state, TransactionKind::Income);
        let (_, Json(transaction)) =
            create_transaction_endpoint(State(state.clone()), Path(owner_id), Json(lunch()))
                .await
                .unwrap();

        let result = edit_transaction_endpoint(
            State(state),
            Path((owner_id, transaction.id)),
            Json(lunch().category_id(Some(salary.id))),
        )
        .await;

        assert_eq!(
            result.map(|json| json.0),
            Err(Error::InvalidCategory(Some(salary.id)))
        );
    }
}
