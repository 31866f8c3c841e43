//! Defines the endpoint for the combined total balance.
//!
//! The total is the sum of three views over the store: the signed
//! transaction amounts, the negated payment amounts, and the received
//! amounts of all debts. This is the number the outgoing-transaction
//! validation treats as authoritative.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    Error, debt::debt_balance, payment::payment_balance,
    transaction::core::transaction_balance, transaction::get_endpoints::TransactionReadState,
};

/// The combined total balance across transactions, payments and debts.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn total_balance(connection: &Connection) -> Result<f64, Error> {
    Ok(transaction_balance(connection)?
        + payment_balance(connection)?
        + debt_balance(connection)?)
}

/// A route handler returning the combined total balance as a bare JSON
/// number.
pub async fn total_balance_endpoint(State(state): State<TransactionReadState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match total_balance(&connection) {
        Ok(balance) => Json(balance).into_response(),
        Err(error) => {
            tracing::error!("could not compute the total balance: {error}");
            error.into_response()
        }
    }
}
