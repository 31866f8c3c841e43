//! The outbound email seam.
//!
//! Reminder emails leave the application through the [Mailer] trait. The
//! production implementation hands messages to an HTTP mail relay as JSON;
//! tests substitute a recording stub.

use std::future::Future;

use serde::Serialize;

use crate::Error;

/// An email ready to be handed to the mail transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    /// The recipient address.
    pub to: String,
    /// The subject line.
    pub subject: String,
    /// The plain-text body.
    pub body: String,
}

/// Hands outbound email to a transport.
pub trait Mailer: Clone + Send + Sync + 'static {
    /// Send `message`, returning once the transport has accepted it.
    ///
    /// # Errors
    /// Returns [Error::EmailError] if the transport refuses the message or
    /// cannot be reached.
    fn send(&self, message: &EmailMessage) -> impl Future<Output = Result<(), Error>> + Send;
}

/// A [Mailer] that POSTs messages as JSON to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
}

impl HttpMailer {
    /// Create a mailer that delivers to the relay at `relay_url`.
    pub fn new(relay_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url: relay_url.to_owned(),
        }
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), Error> {
        self.client
            .post(&self.relay_url)
            .json(message)
            .send()
            .await
            .map_err(|error| Error::EmailError(error.to_string()))?
            .error_for_status()
            .map_err(|error| Error::EmailError(error.to_string()))?;

        Ok(())
    }
}
