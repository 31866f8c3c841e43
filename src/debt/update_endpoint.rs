//! Defines the endpoint for updating an existing debt.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    database_id::DebtId,
    debt::{
        core::{DebtData, update_debt},
        create_endpoint::DebtState,
    },
};

/// A route handler for replacing the descriptive fields of a debt.
///
/// The status and notification settings are left untouched; those change
/// through payments and the notification routes.
pub async fn update_debt_endpoint(
    State(state): State<DebtState>,
    Path(debt_id): Path<DebtId>,
    Json(data): Json<DebtData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_debt(debt_id, &data, &connection) {
        Ok(debt) => Json(debt).into_response(),
        Err(error) => {
            tracing::error!("could not update debt {debt_id}: {error}");
            error.into_response()
        }
    }
}
