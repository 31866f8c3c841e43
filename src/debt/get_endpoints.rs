//! Defines the endpoints for reading debts.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    database_id::DebtId,
    debt::{
        core::{get_all_debts, get_debt},
        create_endpoint::DebtState,
    },
};

/// A route handler for fetching a single debt by its ID.
pub async fn get_debt_endpoint(
    State(state): State<DebtState>,
    Path(debt_id): Path<DebtId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_debt(debt_id, &connection) {
        Ok(debt) => Json(debt).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing every debt.
pub async fn list_debts_endpoint(State(state): State<DebtState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_all_debts(&connection) {
        Ok(debts) => Json(debts).into_response(),
        Err(error) => {
            tracing::error!("could not list debts: {error}");
            error.into_response()
        }
    }
}
