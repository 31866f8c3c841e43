//! Defines the endpoint for recording a payment against a debt.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    database_id::DebtId,
    debt::DebtState,
    payment::core::{PaymentData, add_payment},
};

/// A route handler for recording a payment against a debt.
///
/// The debt's outstanding amount shrinks by the paid amount; paying it off
/// completely closes the debt and stops its reminders.
pub async fn create_payment_endpoint(
    State(state): State<DebtState>,
    Path(debt_id): Path<DebtId>,
    Json(data): Json<PaymentData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match add_payment(debt_id, &data, &connection) {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(error) => {
            tracing::error!("could not record a payment against debt {debt_id}: {error}");
            error.into_response()
        }
    }
}
