//! Defines the core data model and database queries for payments.
//!
//! A payment is a single installment applied against a debt's outstanding
//! amount. Recording one decrements the debt; editing one first reverses
//! the old amount and then applies the new one, so repeating the same edit
//! leaves the debt unchanged.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{DebtId, PaymentId},
    debt::core::{apply_return_amount, get_debt},
};

// ============================================================================
// MODELS
// ============================================================================

/// A single installment paid against a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// The ID of the payment.
    pub id: PaymentId,
    /// The debt the payment was made against.
    pub debt_id: DebtId,
    /// When the payment was made.
    pub date: Date,
    /// The paid amount.
    pub amount: f64,
}

/// The request body for recording or updating a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentData {
    /// When the payment was made.
    pub date: Date,
    /// The paid amount.
    pub amount: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record a payment against the debt `debt_id`.
///
/// The debt's outstanding amount is decremented by the paid amount. When
/// it reaches zero the debt is closed and its notification flag cleared.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `debt_id` does not refer to a valid debt,
/// - [Error::InvalidAmount] if the amount exceeds what is still owed,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_payment(
    debt_id: DebtId,
    data: &PaymentData,
    connection: &Connection,
) -> Result<Payment, Error> {
    let debt = get_debt(debt_id, connection)?;

    if data.amount > debt.return_amount {
        return Err(Error::InvalidAmount(format!(
            "payment of {} exceeds the {} still owed on debt {}",
            data.amount, debt.return_amount, debt_id
        )));
    }

    let payment = connection
        .prepare(
            "INSERT INTO payment (debt_id, date, amount)
             VALUES (?1, ?2, ?3)
             RETURNING id, debt_id, date, amount",
        )?
        .query_row((debt_id, data.date, data.amount), map_payment_row)?;

    apply_return_amount(debt_id, debt.return_amount - data.amount, connection)?;

    Ok(payment)
}

/// Replace the date and amount of the payment `payment_id` on the debt
/// `debt_id`.
///
/// The old amount's effect on the debt is reversed before the new amount
/// is applied, so calling this twice with the same values changes nothing
/// the second time. The open→closed transition is re-evaluated the same
/// way as when recording a payment; a closed debt is never reopened.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the debt or payment does not exist,
/// - [Error::PaymentDebtMismatch] if the payment belongs to another debt,
/// - [Error::InvalidAmount] if the new amount exceeds what the debt would
///   owe with the old payment reversed,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_payment(
    debt_id: DebtId,
    payment_id: PaymentId,
    data: &PaymentData,
    connection: &Connection,
) -> Result<Payment, Error> {
    let debt = get_debt(debt_id, connection)?;
    let payment = get_payment(payment_id, connection)?;

    if payment.debt_id != debt_id {
        return Err(Error::PaymentDebtMismatch {
            debt_id,
            payment_id,
        });
    }

    // What the debt would owe with the old payment rolled back.
    let owed_without_old = debt.return_amount + payment.amount;

    if data.amount > owed_without_old {
        return Err(Error::InvalidAmount(format!(
            "payment of {} exceeds the {} owed on debt {} once the previous payment of {} is reversed",
            data.amount, owed_without_old, debt_id, payment.amount
        )));
    }

    let updated = connection
        .prepare(
            "UPDATE payment SET date = ?1, amount = ?2
             WHERE id = ?3
             RETURNING id, debt_id, date, amount",
        )?
        .query_row((data.date, data.amount, payment_id), map_payment_row)?;

    apply_return_amount(debt_id, owed_without_old - data.amount, connection)?;

    Ok(updated)
}

/// Retrieve a payment from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid payment,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_payment(id: PaymentId, connection: &Connection) -> Result<Payment, Error> {
    let payment = connection
        .prepare("SELECT id, debt_id, date, amount FROM payment WHERE id = :id")?
        .query_row(&[(":id", &id)], map_payment_row)?;

    Ok(payment)
}

/// Retrieve the payments recorded against the debt `debt_id`, in storage
/// order.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_payments_for_debt(
    debt_id: DebtId,
    connection: &Connection,
) -> Result<Vec<Payment>, Error> {
    connection
        .prepare("SELECT id, debt_id, date, amount FROM payment WHERE debt_id = :debt_id")?
        .query_map(&[(":debt_id", &debt_id)], map_payment_row)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

/// The sum of negated payment amounts across all payments.
///
/// Money paid into debts has left the ledger, so this view is negative
/// whenever any payments exist.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn payment_balance(connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(-amount), 0.0) FROM payment",
            [],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the payment table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS payment (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                debt_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                FOREIGN KEY(debt_id) REFERENCES debt(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Payment].
pub fn map_payment_row(row: &Row) -> Result<Payment, rusqlite::Error> {
    Ok(Payment {
        id: row.get(0)?,
        debt_id: row.get(1)?,
        date: row.get(2)?,
        amount: row.get(3)?,
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
        debt::core::{DebtStatus, create_debt, get_debt, test_utils::test_debt_data},
        payment::core::{
            PaymentData, add_payment, get_payment, get_payments_for_debt, payment_balance,
            update_payment,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn test_payment(amount: f64) -> PaymentData {
        PaymentData {
            date: date!(2024 - 02 - 01),
            amount,
        }
    }

    #[test]
    fn payment_decrements_outstanding_amount() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();

        add_payment(debt.id, &test_payment(300.0), &conn).unwrap();

        let debt = get_debt(debt.id, &conn).unwrap();
        assert_eq!(debt.return_amount, 700.0);
        assert_eq!(debt.status, DebtStatus::Open);
    }

    #[test]
    fn final_payment_closes_debt() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        add_payment(debt.id, &test_payment(300.0), &conn).unwrap();

        add_payment(debt.id, &test_payment(700.0), &conn).unwrap();

        let debt = get_debt(debt.id, &conn).unwrap();
        assert_eq!(debt.return_amount, 0.0);
        assert_eq!(debt.status, DebtStatus::Closed);
        assert!(!debt.is_notified);
    }

    #[test]
    fn payment_exceeding_outstanding_amount_fails() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();

        let result = add_payment(debt.id, &test_payment(1_500.0), &conn);

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        // Nothing was stored.
        assert_eq!(get_payments_for_debt(debt.id, &conn).unwrap(), vec![]);
        assert_eq!(get_debt(debt.id, &conn).unwrap().return_amount, 1_000.0);
    }

    #[test]
    fn payment_against_missing_debt_fails() {
        let conn = get_test_connection();

        let result = add_payment(42, &test_payment(100.0), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_reverses_old_amount_before_applying_new() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        let payment = add_payment(debt.id, &test_payment(300.0), &conn).unwrap();

        update_payment(debt.id, payment.id, &test_payment(500.0), &conn).unwrap();

        let debt = get_debt(debt.id, &conn).unwrap();
        assert_eq!(debt.return_amount, 500.0);
        assert_eq!(get_payment(payment.id, &conn).unwrap().amount, 500.0);
    }

    #[test]
    fn repeating_the_same_update_changes_nothing() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        let payment = add_payment(debt.id, &test_payment(300.0), &conn).unwrap();

        update_payment(debt.id, payment.id, &test_payment(450.0), &conn).unwrap();
        update_payment(debt.id, payment.id, &test_payment(450.0), &conn).unwrap();

        let debt = get_debt(debt.id, &conn).unwrap();
        assert_eq!(debt.return_amount, 550.0);
    }

    #[test]
    fn update_can_close_debt() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        let payment = add_payment(debt.id, &test_payment(300.0), &conn).unwrap();

        update_payment(debt.id, payment.id, &test_payment(1_000.0), &conn).unwrap();

        let debt = get_debt(debt.id, &conn).unwrap();
        assert_eq!(debt.return_amount, 0.0);
        assert_eq!(debt.status, DebtStatus::Closed);
    }

    #[test]
    fn shrinking_a_closing_payment_does_not_reopen_debt() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        let payment = add_payment(debt.id, &test_payment(1_000.0), &conn).unwrap();
        assert_eq!(get_debt(debt.id, &conn).unwrap().status, DebtStatus::Closed);

        update_payment(debt.id, payment.id, &test_payment(600.0), &conn).unwrap();

        let debt = get_debt(debt.id, &conn).unwrap();
        assert_eq!(debt.return_amount, 400.0);
        assert_eq!(debt.status, DebtStatus::Closed);
    }

    #[test]
    fn update_rejects_amount_exceeding_reversed_balance() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        let payment = add_payment(debt.id, &test_payment(300.0), &conn).unwrap();

        let result = update_payment(debt.id, payment.id, &test_payment(1_100.0), &conn);

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(get_debt(debt.id, &conn).unwrap().return_amount, 700.0);
    }

    #[test]
    fn update_rejects_payment_from_another_debt() {
        let conn = get_test_connection();
        let first = create_debt(&test_debt_data(), &conn).unwrap();
        let mut other_data = test_debt_data();
        other_data.category = "bike loan".to_owned();
        let second = create_debt(&other_data, &conn).unwrap();
        let payment = add_payment(first.id, &test_payment(300.0), &conn).unwrap();

        let result = update_payment(second.id, payment.id, &test_payment(100.0), &conn);

        assert_eq!(
            result,
            Err(Error::PaymentDebtMismatch {
                debt_id: second.id,
                payment_id: payment.id,
            })
        );
    }

    #[test]
    fn update_missing_payment_fails() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();

        let result = update_payment(debt.id, 42, &test_payment(100.0), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn balance_is_negated_payment_sum() {
        let conn = get_test_connection();
        let debt = create_debt(&test_debt_data(), &conn).unwrap();
        add_payment(debt.id, &test_payment(300.0), &conn).unwrap();
        add_payment(debt.id, &test_payment(200.0), &conn).unwrap();

        assert_eq!(payment_balance(&conn).unwrap(), -500.0);
    }

    #[test]
    fn balance_of_no_payments_is_zero() {
        let conn = get_test_connection();

        assert_eq!(payment_balance(&conn).unwrap(), 0.0);
    }
}
