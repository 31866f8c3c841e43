//! Defines the endpoint for a debt's generated payment schedule.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    database_id::DebtId,
    debt::{
        core::{get_debt, payment_plan},
        create_endpoint::DebtState,
    },
};

/// A route handler returning the scheduled payment dates for a debt.
pub async fn get_payment_plan_endpoint(
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

    let debt = match get_debt(debt_id, &connection) {
        Ok(debt) => debt,
        Err(error) => return error.into_response(),
    };

    match payment_plan(&debt) {
        Ok(plan) => Json(plan).into_response(),
        Err(error) => {
            tracing::error!("could not generate a payment plan for debt {debt_id}: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        debt::{
            core::{create_debt, test_utils::test_debt_data},
            create_endpoint::DebtState,
            plan_endpoint::get_payment_plan_endpoint,
        },
    };

    fn get_test_state() -> DebtState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DebtState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    #[tokio::test]
    async fn returns_schedule_for_debt() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_debt(&test_debt_data(), &connection).unwrap();
        }

        let response = get_payment_plan_endpoint(State(state), Path(1))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_debt_gives_not_found() {
        let state = get_test_state();

        let response = get_payment_plan_endpoint(State(state), Path(42))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
