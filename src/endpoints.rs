//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/v1/debt/{debt_id}', use
//! [format_endpoint].

/// The route to create or list transactions.
pub const TRANSACTIONS: &str = "/api/v1/transaction";
/// The route to get, update or delete a single transaction.
pub const TRANSACTION: &str = "/api/v1/transaction/{transaction_id}";
/// The route for the combined total balance.
pub const TRANSACTION_BALANCE: &str = "/api/v1/transaction/balance";
/// The route for the daily balance snapshot series.
pub const BALANCE_HISTORY: &str = "/api/v1/transaction/balance/history";
/// The route to create or list debts.
pub const DEBTS: &str = "/api/v1/debt";
/// The route to get or update a single debt.
pub const DEBT: &str = "/api/v1/debt/{debt_id}";
/// The route for a debt's generated payment schedule.
pub const DEBT_PLAN: &str = "/api/v1/debt/{debt_id}/plan";
/// The route to apply notification settings to every open debt.
pub const DEBT_NOTIFICATIONS: &str = "/api/v1/debt/notification";
/// The route to change notification settings on a single debt.
pub const DEBT_NOTIFICATION: &str = "/api/v1/debt/{debt_id}/notification";
/// The route to record a payment against a debt.
pub const DEBT_PAYMENTS: &str = "/api/v1/debt/{debt_id}/payment";
/// The route to update a payment on a debt.
pub const DEBT_PAYMENT: &str = "/api/v1/debt/{debt_id}/payment/{payment_id}";
/// The route for the category cross-lookup over transactions and debts.
pub const CATEGORY: &str = "/api/v1/{category}";

/// Replace the first parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace. For
/// example, in the endpoint path '/api/v1/debt/{debt_id}', '{debt_id}' is
/// the parameter.
///
/// Paths with two parameters can be formatted by calling this function
/// once per parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
