//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    balance_client::BalanceSource,
    transaction::core::{TransactionData, create_transaction},
};

/// The state needed to create or update a transaction.
#[derive(Debug, Clone)]
pub struct TransactionWriteState<B>
where
    B: BalanceSource,
{
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The client for the authoritative total balance.
    pub balance_source: B,
}

impl<B> FromRef<AppState<B>> for TransactionWriteState<B>
where
    B: BalanceSource,
{
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            balance_source: state.balance_source.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// Outgoing amounts are validated against the authoritative total balance
/// before anything is stored; the category is assigned from the sign of
/// the amount.
pub async fn create_transaction_endpoint<B>(
    State(state): State<TransactionWriteState<B>>,
    Json(data): Json<TransactionData>,
) -> Response
where
    B: BalanceSource,
{
    if let Err(error) = check_outgoing_amount(&data, &state.balance_source).await {
        return error.into_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_transaction(&data, &connection) {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_response()
        }
    }
}

/// Check an outgoing amount against the authoritative total balance.
///
/// Incoming (positive) amounts pass unchecked. An outgoing amount fails
/// with [Error::InvalidAmount] when the total balance is zero or its
/// magnitude exceeds the total balance.
pub(crate) async fn check_outgoing_amount<B>(
    data: &TransactionData,
    balance_source: &B,
) -> Result<(), Error>
where
    B: BalanceSource,
{
    if data.amount > 0.0 {
        return Ok(());
    }

    let total_balance = balance_source.total_balance().await?;

    if total_balance == 0.0 || data.amount.abs() > total_balance {
        return Err(Error::InvalidAmount(format!(
            "outgoing amount {} exceeds the available balance {}",
            data.amount, total_balance
        )));
    }

    Ok(())
}
