//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState,
    balance::balance_history_endpoint,
    balance_client::BalanceSource,
    category::get_category_endpoint,
    debt::{
        create_debt_endpoint, get_debt_endpoint, get_payment_plan_endpoint, list_debts_endpoint,
        update_debt_endpoint,
    },
    endpoints,
    notification::{create_notifications_endpoint, enable_notification_endpoint},
    payment::{create_payment_endpoint, update_payment_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, total_balance_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router<B>(state: AppState<B>) -> Router
where
    B: BalanceSource,
{
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint::<B>).get(list_transactions_endpoint),
        )
        .route(endpoints::TRANSACTION_BALANCE, get(total_balance_endpoint))
        .route(endpoints::BALANCE_HISTORY, get(balance_history_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint::<B>)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::DEBTS,
            post(create_debt_endpoint).get(list_debts_endpoint),
        )
        .route(
            endpoints::DEBT_NOTIFICATIONS,
            post(create_notifications_endpoint),
        )
        .route(
            endpoints::DEBT,
            get(get_debt_endpoint).put(update_debt_endpoint),
        )
        .route(endpoints::DEBT_PLAN, get(get_payment_plan_endpoint))
        .route(
            endpoints::DEBT_NOTIFICATION,
            put(enable_notification_endpoint),
        )
        .route(endpoints::DEBT_PAYMENTS, post(create_payment_endpoint))
        .route(endpoints::DEBT_PAYMENT, put(update_payment_endpoint))
        .route(endpoints::CATEGORY, get(get_category_endpoint))
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState, balance_client::testing::FixedBalanceSource, build_router, endpoints,
        endpoints::format_endpoint,
    };

    fn test_server(authoritative_balance: f64) -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(
            conn,
            "Etc/UTC",
            FixedBalanceSource(authoritative_balance),
        )
        .unwrap();

        TestServer::new(build_router(state)).unwrap()
    }

    fn test_debt_body() -> Value {
        json!({
            "startDate": "2024-01-01",
            "endDate": "2024-01-31",
            "category": "car loan",
            "receivedAmount": 1000.0,
            "periodicPayment": 10,
            "reminder": "pay from the joint account",
        })
    }

    #[tokio::test]
    async fn transaction_balance_reflects_signed_amounts() {
        let server = test_server(10_000.0);

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "date": "2024-03-15", "amount": 500.0, "comment": "salary" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["category"], "income");

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "date": "2024-03-16", "amount": -200.0, "comment": "groceries" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let response = server.get(endpoints::TRANSACTION_BALANCE).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<f64>(), 300.0);
    }

    #[tokio::test]
    async fn outgoing_transaction_above_balance_is_rejected() {
        let server = test_server(100.0);

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "date": "2024-03-15", "amount": -500.0, "comment": "rent" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(body["error"].as_str().unwrap().contains("invalid amount"));
    }

    #[tokio::test]
    async fn debt_is_paid_off_over_two_payments() {
        let server = test_server(10_000.0);

        let response = server.post(endpoints::DEBTS).json(&test_debt_body()).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let debt_id = response.json::<Value>()["id"].as_i64().unwrap();

        let payments_path = format_endpoint(endpoints::DEBT_PAYMENTS, debt_id);
        let response = server
            .post(&payments_path)
            .json(&json!({ "date": "2024-01-11", "amount": 300.0 }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let response = server
            .get(&format_endpoint(endpoints::DEBT, debt_id))
            .await;
        let debt = response.json::<Value>();
        assert_eq!(debt["returnAmount"], 700.0);
        assert_eq!(debt["status"], "open");

        let response = server
            .post(&payments_path)
            .json(&json!({ "date": "2024-01-21", "amount": 700.0 }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let response = server
            .get(&format_endpoint(endpoints::DEBT, debt_id))
            .await;
        let debt = response.json::<Value>();
        assert_eq!(debt["returnAmount"], 0.0);
        assert_eq!(debt["status"], "closed");
    }

    #[tokio::test]
    async fn payment_plan_route_returns_schedule() {
        let server = test_server(10_000.0);
        let response = server.post(endpoints::DEBTS).json(&test_debt_body()).await;
        let debt_id = response.json::<Value>()["id"].as_i64().unwrap();

        let response = server
            .get(&format_endpoint(endpoints::DEBT_PLAN, debt_id))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.json::<Value>(),
            json!(["2024-01-01", "2024-01-11", "2024-01-21", "2024-01-31"])
        );
    }

    #[tokio::test]
    async fn category_lookup_distinguishes_the_two_kinds() {
        let server = test_server(10_000.0);
        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "date": "2024-03-15", "amount": 500.0, "comment": "salary" }))
            .await;
        server.post(endpoints::DEBTS).json(&test_debt_body()).await;

        let response = server.get("/api/v1/income").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);

        let response = server.get("/api/v1/car%20loan").await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let response = server.get("/api/v1/petrol").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn notifying_a_closed_debt_gives_conflict() {
        let server = test_server(10_000.0);
        let response = server.post(endpoints::DEBTS).json(&test_debt_body()).await;
        let debt_id = response.json::<Value>()["id"].as_i64().unwrap();
        server
            .post(&format_endpoint(endpoints::DEBT_PAYMENTS, debt_id))
            .json(&json!({ "date": "2024-01-11", "amount": 1000.0 }))
            .await;

        let response = server
            .put(&format_endpoint(endpoints::DEBT_NOTIFICATION, debt_id))
            .json(&json!({ "isNotified": true, "email": "person@example.com" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn deleting_a_missing_transaction_gives_not_found() {
        let server = test_server(10_000.0);

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, 42))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
