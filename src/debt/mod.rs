//! Debt management for the bookkeeping backend.
//!
//! This module contains everything related to debts:
//! - The `Debt` model with its open/closed status and notification fields
//! - Database functions for storing and querying debts
//! - The naive payment schedule generator
//! - The route handlers for the debt API

pub(crate) mod core;
mod create_endpoint;
mod get_endpoints;
mod plan_endpoint;
mod update_endpoint;

pub use self::core::{
    Debt, DebtData, DebtStatus, create_debt_table, debt_balance, get_all_debts, get_debt,
    get_debts_by_category, payment_plan,
};
pub use create_endpoint::{DebtState, create_debt_endpoint};
pub use get_endpoints::{get_debt_endpoint, list_debts_endpoint};
pub use plan_endpoint::get_payment_plan_endpoint;
pub use update_endpoint::update_debt_endpoint;

#[cfg(test)]
pub(crate) use self::core::create_debt;
