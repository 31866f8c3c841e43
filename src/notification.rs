//! Notification opt-in management for debts.
//!
//! Debts only receive reminder emails after a contact address has been
//! attached to them, either in bulk across every open debt or one debt at
//! a time. Closed debts are skipped: there is nothing left to remind
//! anyone about.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::DebtId,
    debt::{
        DebtState, DebtStatus,
        core::{DEBT_COLUMNS, Debt, get_debt, map_debt_row},
    },
};

/// The request body for changing a debt's notification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Whether reminder emails should be sent.
    pub is_notified: bool,
    /// Where reminder emails should be sent.
    pub email: String,
}

/// Apply `data` to every open debt.
///
/// Closed debts are left untouched. Returns the debts that were updated.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn apply_notifications(
    data: &NotificationData,
    connection: &Connection,
) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(&format!(
            "UPDATE debt SET is_notified = ?1, email = ?2
             WHERE status = 'open'
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_map((data.is_notified, &data.email), map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(|error| error.into()))
        .collect()
}

/// Apply `data` to the debt `debt_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `debt_id` does not refer to a valid debt,
/// - [Error::DebtAlreadyClosed] if the debt has been fully repaid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn enable_notification(
    debt_id: DebtId,
    data: &NotificationData,
    connection: &Connection,
) -> Result<Debt, Error> {
    let debt = get_debt(debt_id, connection)?;

    if debt.status == DebtStatus::Closed {
        return Err(Error::DebtAlreadyClosed(debt_id));
    }

    let debt = connection
        .prepare(&format!(
            "UPDATE debt SET is_notified = ?1, email = ?2
             WHERE id = ?3
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_row((data.is_notified, &data.email, debt_id), map_debt_row)?;

    Ok(debt)
}

/// A route handler applying notification settings to every open debt.
pub async fn create_notifications_endpoint(
    State(state): State<DebtState>,
    Json(data): Json<NotificationData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match apply_notifications(&data, &connection) {
        Ok(debts) => (StatusCode::CREATED, Json(debts)).into_response(),
        Err(error) => {
            tracing::error!("could not apply notification settings: {error}");
            error.into_response()
        }
    }
}

/// A route handler changing notification settings on a single debt.
pub async fn enable_notification_endpoint(
    State(state): State<DebtState>,
    Path(debt_id): Path<DebtId>,
    Json(data): Json<NotificationData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match enable_notification(debt_id, &data, &connection) {
        Ok(debt) => Json(debt).into_response(),
        Err(error) => {
            tracing::error!(
                "could not change notification settings on debt {debt_id}: {error}"
            );
            error.into_response()
        }
    }
}
