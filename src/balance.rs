//! The daily balance snapshot series.
//!
//! Once a day the snapshot job reads the authoritative total balance and
//! appends it to an independent, append-only series. The series is served
//! back on the balance history route.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time, UtcOffset};

use crate::{
    AppState, Error,
    balance_client::BalanceSource,
    database_id::BalanceRecordId,
    reminder::next_run_delay,
    timezone::get_local_offset,
};

// ============================================================================
// MODELS
// ============================================================================

/// A once-daily record of the total balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    /// The ID of the snapshot.
    pub id: BalanceRecordId,
    /// The day the snapshot was taken.
    pub date: Date,
    /// The total balance on that day.
    pub balance_amount: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Append a snapshot of `balance_amount` for `date` to the series.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn record_balance(
    date: Date,
    balance_amount: f64,
    connection: &Connection,
) -> Result<BalanceRecord, Error> {
    let record = connection
        .prepare(
            "INSERT INTO balance_history (date, balance_amount)
             VALUES (?1, ?2)
             RETURNING id, date, balance_amount",
        )?
        .query_row((date, balance_amount), map_balance_row)?;

    Ok(record)
}

/// Retrieve the whole snapshot series, oldest first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_balance_history(connection: &Connection) -> Result<Vec<BalanceRecord>, Error> {
    connection
        .prepare("SELECT id, date, balance_amount FROM balance_history ORDER BY id")?
        .query_map([], map_balance_row)?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}

/// Create the balance history table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_balance_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS balance_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                balance_amount REAL NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [BalanceRecord].
pub fn map_balance_row(row: &Row) -> Result<BalanceRecord, rusqlite::Error> {
    Ok(BalanceRecord {
        id: row.get(0)?,
        date: row.get(1)?,
        balance_amount: row.get(2)?,
    })
}

// ============================================================================
// ENDPOINT
// ============================================================================

/// The state needed to read the snapshot series.
#[derive(Debug, Clone)]
pub struct BalanceHistoryState {
    /// The database connection for reading snapshots.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl<B> FromRef<AppState<B>> for BalanceHistoryState
where
    B: BalanceSource,
{
    fn from_ref(state: &AppState<B>) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler returning the daily balance snapshot series.
pub async fn balance_history_endpoint(State(state): State<BalanceHistoryState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_balance_history(&connection) {
        Ok(records) => Json(records).into_response(),
        Err(error) => {
            tracing::error!("could not read the balance history: {error}");
            error.into_response()
        }
    }
}

// ============================================================================
// SNAPSHOT JOB
// ============================================================================

/// Run the snapshot job until the process exits.
///
/// Sleeps until the next occurrence of `snapshot_time` in
/// `local_timezone`, records one snapshot, and repeats. An unknown
/// timezone falls back to UTC.
pub async fn run_snapshot_job<B>(
    db_connection: Arc<Mutex<Connection>>,
    balance_source: B,
    local_timezone: String,
    snapshot_time: Time,
) where
    B: BalanceSource,
{
    loop {
        let offset = get_local_offset(&local_timezone).unwrap_or(UtcOffset::UTC);
        let now = OffsetDateTime::now_utc().to_offset(offset);
        tokio::time::sleep(next_run_delay(now, snapshot_time)).await;

        let offset = get_local_offset(&local_timezone).unwrap_or(UtcOffset::UTC);
        let today = OffsetDateTime::now_utc().to_offset(offset).date();

        match take_snapshot(&db_connection, &balance_source, today).await {
            Ok(record) => {
                tracing::info!(
                    "recorded a balance snapshot of {} for {}",
                    record.balance_amount,
                    record.date
                );
            }
            Err(error) => tracing::error!("could not record a balance snapshot: {error}"),
        }
    }
}

/// Fetch the authoritative total balance and append it to the series.
///
/// # Errors
/// This function will return an error if the balance cannot be fetched or
/// the snapshot cannot be stored.
pub(crate) async fn take_snapshot<B>(
    db_connection: &Arc<Mutex<Connection>>,
    balance_source: &B,
    today: Date,
) -> Result<BalanceRecord, Error>
where
    B: BalanceSource,
{
    let total_balance = balance_source.total_balance().await?;

    let connection = db_connection.lock().map_err(|_| Error::DatabaseLockError)?;
    record_balance(today, total_balance, &connection)
}

// ============================================================================
// TESTS
// ============================================================================
