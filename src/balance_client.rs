//! The authoritative-balance seam.
//!
//! Outgoing transactions are validated against the total balance reported
//! by the balance endpoint. The [BalanceSource] trait abstracts that
//! lookup so handlers do not care whether the number comes from this
//! server's own balance route or another deployment's.

use std::future::Future;

use crate::{Error, endpoints};

/// Fetches the authoritative total balance.
pub trait BalanceSource: Clone + Send + Sync + 'static {
    /// The total balance across transactions, payments and debts.
    ///
    /// # Errors
    /// Returns [Error::BalanceUnavailable] if the balance endpoint cannot
    /// be reached or returns garbage.
    fn total_balance(&self) -> impl Future<Output = Result<f64, Error>> + Send;
}

/// A [BalanceSource] that GETs the balance endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBalanceSource {
    client: reqwest::Client,
    balance_url: String,
}

impl HttpBalanceSource {
    /// Create a balance source that queries the server at `base_url`, e.g.
    /// `http://127.0.0.1:3000`.
    ///
    /// The server points this at its own address by default, so the number
    /// used for validation is the same one clients see on the balance
    /// route.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            balance_url: format!(
                "{}{}",
                base_url.trim_end_matches('/'),
                endpoints::TRANSACTION_BALANCE
            ),
        }
    }
}

impl BalanceSource for HttpBalanceSource {
    async fn total_balance(&self) -> Result<f64, Error> {
        let response = self
            .client
            .get(&self.balance_url)
            .send()
            .await
            .map_err(|error| Error::BalanceUnavailable(error.to_string()))?
            .error_for_status()
            .map_err(|error| Error::BalanceUnavailable(error.to_string()))?;

        response
            .json::<f64>()
            .await
            .map_err(|error| Error::BalanceUnavailable(error.to_string()))
    }
}
