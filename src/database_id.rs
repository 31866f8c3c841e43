//! Type aliases for database row IDs.
//!
//! These exist to make function signatures self-documenting: a
//! `get_payment(PaymentId, ...)` reads better than `get_payment(i64, ...)`
//! and makes it harder to pass the wrong ID to the wrong query.

/// The integer primary key of a database row.
pub type DatabaseId = i64;

/// The ID of a transaction row.
pub type TransactionId = DatabaseId;

/// The ID of a debt row.
pub type DebtId = DatabaseId;

/// The ID of a payment row.
pub type PaymentId = DatabaseId;

/// The ID of a balance snapshot row.
pub type BalanceRecordId = DatabaseId;
