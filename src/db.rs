//! Database initialization for the application's domain tables.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, balance::create_balance_table, debt::create_debt_table, payment::create_payment_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// The tables are created within a single exclusive SQL transaction so that
/// a failure part-way through leaves the database untouched.
///
/// # Errors
/// Returns an error if a table cannot be created or there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_debt_table(&transaction)?;
    create_payment_table(&transaction)?;
    create_balance_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
