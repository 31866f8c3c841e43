//! Defines the endpoints for reading transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    balance_client::BalanceSource,
    database_id::TransactionId,
    transaction::core::{get_all_transactions, get_transaction},
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct TransactionReadState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl<B> FromRef<AppState<B>> for TransactionReadState
where
    B: BalanceSource,
{
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for fetching a single transaction by its ID.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionReadState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_transaction(transaction_id, &connection) {
        Ok(transaction) => Json(transaction).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing every transaction.
pub async fn list_transactions_endpoint(State(state): State<TransactionReadState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_all_transactions(&connection) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => {
            tracing::error!("could not list transactions: {error}");
            error.into_response()
        }
    }
}
