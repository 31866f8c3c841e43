//! Defines the endpoint for removing a transaction from the history.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error, database_id::TransactionId,
    transaction::{core::delete_transaction, get_endpoints::TransactionReadState},
};

/// A route handler for deleting a transaction by its ID.
pub async fn delete_transaction_endpoint(
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

    match delete_transaction(transaction_id, &connection) {
        Ok(()) => Json(json!({ "message": "transaction removed from history" })).into_response(),
        Err(error) => {
            tracing::error!("could not delete transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}
