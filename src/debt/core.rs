//! Defines the core data model and database queries for debts.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{Error, database_id::DebtId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a debt still has an outstanding balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    /// Money is still owed on the debt.
    Open,
    /// The debt has been fully repaid.
    Closed,
}

impl DebtStatus {
    /// The status as it is stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Open => "open",
            DebtStatus::Closed => "closed",
        }
    }
}

/// A borrowed principal with a decreasing outstanding balance.
///
/// The outstanding balance (`return_amount`) starts at the principal and
/// shrinks as payments are recorded against the debt. Once it reaches zero
/// the debt is closed and stops receiving reminders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    /// The ID of the debt.
    pub id: DebtId,
    /// The day the debt was taken on.
    pub start_date: Date,
    /// The day the debt must be fully repaid by.
    pub end_date: Date,
    /// A free-text label, e.g. "mortgage".
    pub category: String,
    /// The borrowed principal.
    pub received_amount: f64,
    /// The outstanding amount still owed.
    pub return_amount: f64,
    /// The number of days between scheduled payments.
    pub periodic_payment: i64,
    /// Whether the debt is still open or fully repaid.
    pub status: DebtStatus,
    /// Whether reminder emails are enabled for this debt.
    pub is_notified: bool,
    /// Where reminder emails are sent, when enabled.
    pub email: Option<String>,
    /// A free-text note included in reminder emails.
    pub reminder: String,
}

/// The request body for creating or updating a debt.
///
/// Status, notification flag and email address are not part of the body;
/// they are controlled by the payment and notification flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtData {
    /// The day the debt was taken on.
    pub start_date: Date,
    /// The day the debt must be fully repaid by.
    pub end_date: Date,
    /// A free-text label, e.g. "mortgage".
    pub category: String,
    /// The borrowed principal.
    pub received_amount: f64,
    /// The outstanding amount. Defaults to the principal when omitted.
    #[serde(default)]
    pub return_amount: Option<f64>,
    /// The number of days between scheduled payments.
    pub periodic_payment: i64,
    /// A free-text note included in reminder emails.
    #[serde(default)]
    pub reminder: String,
}

// ============================================================================
// PAYMENT SCHEDULE
// ============================================================================

/// The ordered dates on which payments against `debt` are scheduled.
///
/// Dates run from the start date in steps of the debt's payment interval.
/// The final element is always the end date, even when the last full
/// interval would overshoot it.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if the payment
/// interval is shorter than one day or the end date precedes the start
/// date.
pub fn payment_plan(debt: &Debt) -> Result<Vec<Date>, Error> {
    if debt.periodic_payment < 1 {
        return Err(Error::InvalidAmount(format!(
            "the payment interval must be at least one day, got {}",
            debt.periodic_payment
        )));
    }

    if debt.end_date < debt.start_date {
        return Err(Error::InvalidAmount(format!(
            "the debt ends ({}) before it starts ({})",
            debt.end_date, debt.start_date
        )));
    }

    let step = Duration::days(debt.periodic_payment);
    let mut dates = Vec::new();
    let mut current = debt.start_date;

    while current < debt.end_date {
        dates.push(current);
        current = current.saturating_add(step);
    }

    dates.push(debt.end_date);

    Ok(dates)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(crate) const DEBT_COLUMNS: &str =
    "id, start_date, end_date, category, received_amount, return_amount,
     periodic_payment, status, is_notified, email, reminder";

/// Create a new debt in the database.
///
/// The outstanding amount defaults to the principal when the request does
/// not supply one. New debts always start open and without notifications.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_debt(data: &DebtData, connection: &Connection) -> Result<Debt, Error> {
    let return_amount = data.return_amount.unwrap_or(data.received_amount);

    let debt = connection
        .prepare(&format!(
            "INSERT INTO debt (start_date, end_date, category, received_amount, return_amount,
                               periodic_payment, status, is_notified, email, reminder)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'open', 0, NULL, ?7)
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_row(
            (
                data.start_date,
                data.end_date,
                &data.category,
                data.received_amount,
                return_amount,
                data.periodic_payment,
                &data.reminder,
            ),
            map_debt_row,
        )?;

    Ok(debt)
}

/// Replace the descriptive fields of the debt `id` with the values in
/// `data`.
///
/// Status, notification flag and email address are left untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid debt,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_debt(id: DebtId, data: &DebtData, connection: &Connection) -> Result<Debt, Error> {
    let return_amount = data.return_amount.unwrap_or(data.received_amount);

    let debt = connection
        .prepare(&format!(
            "UPDATE debt
             SET start_date = ?1, end_date = ?2, category = ?3, received_amount = ?4,
                 return_amount = ?5, periodic_payment = ?6, reminder = ?7
             WHERE id = ?8
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_row(
            (
                data.start_date,
                data.end_date,
                &data.category,
                data.received_amount,
                return_amount,
                data.periodic_payment,
                &data.reminder,
                id,
            ),
            map_debt_row,
        )?;

    Ok(debt)
}

/// Retrieve a debt from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid debt,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_debt(id: DebtId, connection: &Connection) -> Result<Debt, Error> {
    let debt = connection
        .prepare(&format!("SELECT {DEBT_COLUMNS} FROM debt WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_debt_row)?;

    Ok(debt)
}

/// Retrieve every debt, in storage order.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_all_debts(connection: &Connection) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(&format!("SELECT {DEBT_COLUMNS} FROM debt"))?
        .query_map([], map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the debts whose category equals `category`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_debts_by_category(
    category: &str,
    connection: &Connection,
) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(&format!(
            "SELECT {DEBT_COLUMNS} FROM debt WHERE category = :category"
        ))?
        .query_map(&[(":category", &category)], map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(|error| error.into()))
        .collect()
}

/// The sum of the borrowed principal across all debts.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn debt_balance(connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(received_amount), 0.0) FROM debt",
            [],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Store a new outstanding amount for the debt `id`.
///
/// When the new amount is zero or less, the debt is closed and its
/// notification flag is cleared. A positive amount only replaces the
/// stored value; a closed debt is never reopened here.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid debt,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn apply_return_amount(
    id: DebtId,
    new_return_amount: f64,
    connection: &Connection,
) -> Result<Debt, Error> {
    let statement = if new_return_amount <= 0.0 {
        format!(
            "UPDATE debt SET return_amount = ?1, status = 'closed', is_notified = 0
             WHERE id = ?2
             RETURNING {DEBT_COLUMNS}"
        )
    } else {
        format!("UPDATE debt SET return_amount = ?1 WHERE id = ?2 RETURNING {DEBT_COLUMNS}")
    };

    let debt = connection
        .prepare(&statement)?
        .query_row((new_return_amount, id), map_debt_row)?;

    Ok(debt)
}

/// Create the debt table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS debt (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                category TEXT NOT NULL,
                received_amount REAL NOT NULL,
                return_amount REAL NOT NULL,
                periodic_payment INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'open',
                is_notified INTEGER NOT NULL DEFAULT 0,
                email TEXT,
                reminder TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Debt].
pub fn map_debt_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    let status: String = row.get(7)?;
    let status = if status == "closed" {
        DebtStatus::Closed
    } else {
        DebtStatus::Open
    };

    Ok(Debt {
        id: row.get(0)?,
        start_date: row.get(1)?,
        end_date: row.get(2)?,
        category: row.get(3)?,
        received_amount: row.get(4)?,
        return_amount: row.get(5)?,
        periodic_payment: row.get(6)?,
        status,
        is_notified: row.get(8)?,
        email: row.get(9)?,
        reminder: row.get(10)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        debt::core::{
            DebtStatus, apply_return_amount, create_debt, debt_balance, get_all_debts, get_debt,
            test_utils::test_debt_data, update_debt,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_defaults_outstanding_to_principal() {
        let conn = get_test_connection();

        let debt = create_debt(&test_debt_data(), &conn).unwrap();

        assert_eq!(debt.received_amount, 1_000.0);
        assert_eq!(debt.return_amount, 1_000.0);
        assert_eq!(debt.status, DebtStatus::Open);
        assert!(!debt.is_notified);
        assert_eq!(debt.email, None);
    }

    #[test]
    fn create_keeps_supplied_outstanding_amount() {
        let conn = get_test_connection();
        let mut data = test_debt_data();
        data.return_amount = Some(750.0);

        let debt = create_debt(&data, &conn).unwrap();

        assert_eq!(debt.return_amount, 750.0);
    }

    #[test]
    fn update_replaces_descriptive_fields_only() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        // Closing the debt first shows that update does not touch status.
        apply_return_amount(debt.id, 0.0, &conn).unwrap();

        let mut data = test_debt_data();
        data.category = "boat loan".to_owned();
        data.return_amount = Some(500.0);
        let updated = update_debt(debt.id, &data, &conn).unwrap();

        assert_eq!(updated.category, "boat loan");
        assert_eq!(updated.return_amount, 500.0);
        assert_eq!(updated.status, DebtStatus::Closed);
    }

    #[test]
    fn update_missing_debt_fails() {
        let conn = get_test_connection();

        let result = update_debt(42, &test_debt_data(), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_missing_debt_fails() {
        let conn = get_test_connection();

        assert_eq!(get_debt(1337, &conn), Err(Error::NotFound));
    }

    #[test]
    fn balance_sums_principals() {
        let conn = get_test_connection();
        create_debt(&test_debt_data(), &conn).unwrap();
        let mut second = test_debt_data();
        second.received_amount = 250.0;
        second.category = "bike loan".to_owned();
        create_debt(&second, &conn).unwrap();

        assert_eq!(debt_balance(&conn).unwrap(), 1_250.0);
        assert_eq!(get_all_debts(&conn).unwrap().len(), 2);
    }

    #[test]
    fn reaching_zero_closes_debt_and_clears_notification() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        conn.execute(
            "UPDATE debt SET is_notified = 1, email = 'person@example.com' WHERE id = ?1",
            (debt.id,),
        )
        .unwrap();

        let closed = apply_return_amount(debt.id, 0.0, &conn).unwrap();

        assert_eq!(closed.status, DebtStatus::Closed);
        assert!(!closed.is_notified);

        // A later positive amount does not reopen the debt.
        let still_closed = apply_return_amount(debt.id, 10.0, &conn).unwrap();
        assert_eq!(still_closed.status, DebtStatus::Closed);
    }

    #[test]
    fn date_roundtrip_preserves_values() {
        let conn = get_test_connection();

        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        let fetched = get_debt(debt.id, &conn).unwrap();

        assert_eq!(fetched.start_date, date!(2024 - 01 - 01));
        assert_eq!(fetched.end_date, date!(2024 - 12 - 31));
    }
}
