//! Defines the endpoint for updating an existing transaction.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    balance_client::BalanceSource,
    database_id::TransactionId,
    transaction::{
        core::{TransactionData, update_transaction},
        create_endpoint::{TransactionWriteState, check_outgoing_amount},
    },
};

/// A route handler for replacing every field of an existing transaction.
///
/// Applies the same outgoing-amount validation and sign classification as
/// transaction creation.
pub async fn update_transaction_endpoint<B>(
    State(state): State<TransactionWriteState<B>>,
    Path(transaction_id): Path<TransactionId>,
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

    match update_transaction(transaction_id, &data, &connection) {
        Ok(transaction) => Json(transaction).into_response(),
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}
