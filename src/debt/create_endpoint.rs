//! Defines the endpoint for creating a new debt.

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
    debt::core::{DebtData, create_debt},
};

/// The state needed to manage debts.
#[derive(Debug, Clone)]
pub struct DebtState {
    /// The database connection for managing debts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl<B> FromRef<AppState<B>> for DebtState
where
    B: BalanceSource,
{
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new debt.
///
/// New debts start open, with the outstanding amount defaulting to the
/// principal and notifications disabled.
pub async fn create_debt_endpoint(
    State(state): State<DebtState>,
    Json(data): Json<DebtData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_debt(&data, &connection) {
        Ok(debt) => (StatusCode::CREATED, Json(debt)).into_response(),
        Err(error) => {
            tracing::error!("could not create debt: {error}");
            error.into_response()
        }
    }
}
