//! The category cross-lookup over transactions and debts.
//!
//! Transactions and debts share one free-text category namespace, but any
//! particular label is expected to belong to only one of the two kinds. A
//! lookup therefore returns either transactions or debts, never a mix.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    balance_client::BalanceSource,
    debt::{Debt, get_debts_by_category},
    transaction::{Transaction, get_transactions_by_category},
};

/// The entities matching a category label.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryEntries {
    /// The label matched transactions.
    Transactions(Vec<Transaction>),
    /// The label matched debts.
    Debts(Vec<Debt>),
}

/// Look up the transactions or debts labelled with `category`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if nothing carries the label,
/// - [Error::AmbiguousCategory] if both transactions and debts carry it,
/// - or [Error::SqlError] if there is an SQL error.
pub fn get_entries_by_category(
    category: &str,
    connection: &Connection,
) -> Result<CategoryEntries, Error> {
    let transactions = get_transactions_by_category(category, connection)?;
    let debts = get_debts_by_category(category, connection)?;

    match (transactions.is_empty(), debts.is_empty()) {
        (true, true) => Err(Error::NotFound),
        (false, false) => Err(Error::AmbiguousCategory(category.to_owned())),
        (false, true) => Ok(CategoryEntries::Transactions(transactions)),
        (true, false) => Ok(CategoryEntries::Debts(debts)),
    }
}

/// The state needed for the category lookup.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for querying transactions and debts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl<B> FromRef<AppState<B>> for CategoryState
where
    B: BalanceSource,
{
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler returning everything labelled with a category.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Path(category): Path<String>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_entries_by_category(&category, &connection) {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => error.into_response(),
    }
}
