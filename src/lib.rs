//! Tallybook is a bookkeeping backend for personal finances.
//!
//! It records income and expense transactions, tracks debts and the payments
//! made against them, and keeps a daily series of balance snapshots. The
//! library provides a JSON REST API plus two background jobs that share the
//! same store: a daily reminder scan that emails upcoming debt installments
//! and a daily balance snapshot.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod balance;
mod balance_client;
mod category;
mod database_id;
mod db;
mod debt;
mod endpoints;
mod mailer;
mod notification;
mod payment;
mod reminder;
mod routing;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use balance::run_snapshot_job;
pub use balance_client::{BalanceSource, HttpBalanceSource};
pub use database_id::{DatabaseId, DebtId, PaymentId, TransactionId};
pub use db::initialize as initialize_db;
pub use mailer::{EmailMessage, HttpMailer, Mailer};
pub use reminder::run_reminder_dispatcher;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A monetary amount broke a business rule, e.g. an outgoing transaction
    /// larger than the available balance, or a payment larger than what is
    /// still owed on its debt.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A category lookup matched both transactions and debts.
    ///
    /// Category labels are expected to be disjoint between the two entity
    /// kinds, so a label matching both indicates inconsistent data.
    #[error("category \"{0}\" matches both transactions and debts")]
    AmbiguousCategory(String),

    /// Tried to change notification settings on a debt that has already
    /// been paid off.
    #[error("debt {0} is already paid off")]
    DebtAlreadyClosed(DebtId),

    /// The payment named in the request does not belong to the debt named
    /// in the same request.
    #[error("payment {payment_id} does not belong to debt {debt_id}")]
    PaymentDebtMismatch {
        /// The debt named in the request path.
        debt_id: DebtId,
        /// The payment named in the request path.
        payment_id: PaymentId,
    },

    /// The authoritative total balance could not be fetched from the
    /// balance endpoint.
    #[error("could not fetch the total balance: {0}")]
    BalanceUnavailable(String),

    /// An email could not be handed over to the mail relay.
    #[error("could not send email: {0}")]
    EmailError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidAmount(_)
            | Error::AmbiguousCategory(_)
            | Error::PaymentDebtMismatch { .. } => StatusCode::BAD_REQUEST,
            Error::DebtAlreadyClosed(_) => StatusCode::CONFLICT,
            Error::BalanceUnavailable(_) => StatusCode::BAD_GATEWAY,
            // Any errors that are not handled above are not intended to be
            // shown to the client in detail.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn missing_row_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (Error::NotFound, StatusCode::NOT_FOUND),
            (
                Error::InvalidAmount("too large".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::AmbiguousCategory("rent".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (Error::DebtAlreadyClosed(1), StatusCode::CONFLICT),
            (
                Error::PaymentDebtMismatch {
                    debt_id: 1,
                    payment_id: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::BalanceUnavailable("connection refused".to_owned()),
                StatusCode::BAD_GATEWAY,
            ),
            (Error::DatabaseLockError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, want) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), want);
        }
    }
}
