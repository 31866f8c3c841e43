//! Defines the endpoint for updating a payment on a debt.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    database_id::{DebtId, PaymentId},
    debt::DebtState,
    payment::core::{PaymentData, update_payment},
};

/// A route handler for replacing a payment's date and amount.
///
/// The old amount's effect on the debt is reversed before the new amount
/// is applied.
pub async fn update_payment_endpoint(
    State(state): State<DebtState>,
    Path((debt_id, payment_id)): Path<(DebtId, PaymentId)>,
    Json(data): Json<PaymentData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_payment(debt_id, payment_id, &data, &connection) {
        Ok(payment) => Json(payment).into_response(),
        Err(error) => {
            tracing::error!(
                "could not update payment {payment_id} on debt {debt_id}: {error}"
            );
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        debt::{
            DebtState,
            core::{create_debt, get_debt, test_utils::test_debt_data},
        },
        payment::{
            core::{PaymentData, add_payment},
            update_endpoint::update_payment_endpoint,
        },
    };

    fn get_test_state_with_payment() -> DebtState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        add_payment(
            debt.id,
            &PaymentData {
                date: date!(2024 - 02 - 01),
                amount: 300.0,
            },
            &conn,
        )
        .unwrap();

        DebtState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn updates_payment_amount() {
        let state = get_test_state_with_payment();

        let response = update_payment_endpoint(
            State(state.clone()),
            Path((1, 1)),
            Json(PaymentData {
                date: date!(2024 - 02 - 02),
                amount: 500.0,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_debt(1, &connection).unwrap().return_amount, 500.0);
    }

    #[tokio::test]
    async fn mismatched_debt_gives_bad_request() {
        let state = get_test_state_with_payment();
        {
            let connection = state.db_connection.lock().unwrap();
            let mut data = test_debt_data();
            data.category = "bike loan".to_owned();
            create_debt(&data, &connection).unwrap();
        }

        let response = update_payment_endpoint(
            State(state),
            Path((2, 1)),
            Json(PaymentData {
                date: date!(2024 - 02 - 02),
                amount: 100.0,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_payment_gives_not_found() {
        let state = get_test_state_with_payment();

        let response = update_payment_endpoint(
            State(state),
            Path((1, 42)),
            Json(PaymentData {
                date: date!(2024 - 02 - 02),
                amount: 100.0,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
