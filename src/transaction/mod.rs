//! Transaction management for the bookkeeping backend.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the request body used to create one
//! - Database functions for storing, querying and deleting transactions
//! - The route handlers for the transaction API, including the combined
//!   total balance route

mod balance_endpoint;
pub(crate) mod core;
mod create_endpoint;
mod delete_endpoint;
mod get_endpoints;
mod update_endpoint;

pub use balance_endpoint::{total_balance, total_balance_endpoint};
pub use self::core::{
    Transaction, TransactionData, create_transaction_table, get_transactions_by_category,
    transaction_balance,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use get_endpoints::{get_transaction_endpoint, list_transactions_endpoint};
pub use update_endpoint::update_transaction_endpoint;
