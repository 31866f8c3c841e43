//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// The category label assigned to transactions with a positive amount.
pub const INCOME_CATEGORY: &str = "income";

/// The category label assigned to transactions with a non-positive amount.
pub const OUTCOME_CATEGORY: &str = "outcome";

/// An event where money was either earned or spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// The category label, assigned from the sign of the amount.
    pub category: String,
    /// The amount of money earned (positive) or spent (non-positive).
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub comment: String,
}

/// The request body for creating or updating a transaction.
///
/// The category is not part of the body: it is assigned from the sign of
/// the amount when the transaction is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    /// When the transaction happened.
    pub date: Date,
    /// The signed amount.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub comment: String,
}

/// The category label for `amount`: income for positive amounts, outcome
/// otherwise.
pub fn classify_amount(amount: f64) -> &'static str {
    if amount > 0.0 {
        INCOME_CATEGORY
    } else {
        OUTCOME_CATEGORY
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    data: &TransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (date, category, amount, comment)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, date, category, amount, comment",
        )?
        .query_row(
            (
                data.date,
                classify_amount(data.amount),
                data.amount,
                &data.comment,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Replace every field of the transaction `id` with the values in `data`.
///
/// The category is re-assigned from the sign of the new amount.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    data: &TransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "UPDATE \"transaction\"
             SET date = ?1, category = ?2, amount = ?3, comment = ?4
             WHERE id = ?5
             RETURNING id, date, category, amount, comment",
        )?
        .query_row(
            (
                data.date,
                classify_amount(data.amount),
                data.amount,
                &data.comment,
                id,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare("SELECT id, date, category, amount, comment FROM \"transaction\" WHERE id = :id")?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve every transaction, in storage order.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare("SELECT id, date, category, amount, comment FROM \"transaction\"")?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the transactions whose category equals `category`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_category(
    category: &str,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, date, category, amount, comment FROM \"transaction\"
             WHERE category = :category",
        )?
        .query_map(&[(":category", &category)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Delete the transaction `id` from the history.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The signed sum of all transaction amounts.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn transaction_balance(connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM \"transaction\"",
            [],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                comment TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        comment: row.get(4)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
