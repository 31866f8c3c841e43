//! Payment management for the bookkeeping backend.
//!
//! This module contains everything related to payments:
//! - The `Payment` model and the request body used to record one
//! - Database functions that apply and reverse payment amounts against
//!   the owning debt
//! - The route handlers nested under the debt API

pub(crate) mod core;
mod create_endpoint;
mod update_endpoint;

pub use self::core::{
    Payment, PaymentData, add_payment, create_payment_table, get_payments_for_debt,
    payment_balance, update_payment,
};
pub use create_endpoint::create_payment_endpoint;
pub use update_endpoint::update_payment_endpoint;
