//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, balance_client::BalanceSource, db::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<B>
where
    B: BalanceSource,
{
    /// The database connection shared by request handlers and background
    /// jobs.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The local timezone as a canonical timezone name, e.g.
    /// "Pacific/Auckland".
    pub local_timezone: String,

    /// The client used to fetch the authoritative total balance when
    /// validating outgoing transactions.
    pub balance_source: B,
}

impl<B> AppState<B>
where
    B: BalanceSource,
{
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models. `local_timezone` should be a valid, canonical
    /// timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        balance_source: B,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            local_timezone: local_timezone.to_owned(),
            balance_source,
        })
    }
}
