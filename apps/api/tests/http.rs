//! Router roundtrips over a real socket, backed by the in-memory store.

use kasir_api::{router, AppState};
use kasir_core::CheckoutPolicy;
use kasir_db::{CheckoutEngine, MemoryStore, SalesReportAggregator};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct TestServer {
    base: String,
    client: reqwest::Client,
    store: MemoryStore,
}

impl TestServer {
    async fn start(policy: CheckoutPolicy) -> Self {
        let store = MemoryStore::new();
        let engine = CheckoutEngine::new(store.clone()).with_policy(policy);
        let reports = SalesReportAggregator::new(store.clone());
        let app = router(AppState::new(engine, reports));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
            store,
        }
    }

    async fn post_checkout(&self, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}/checkout", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_checkout_returns_created_transaction() {
    let server = TestServer::start(CheckoutPolicy::default()).await;
    let a = server.store.insert_product("Kopi", 100, 10).id;
    let b = server.store.insert_product("Roti", 50, 5).id;

    let (status, body) = server
        .post_checkout(json!({
            "items": [
                { "product_id": a, "quantity": 3 },
                { "product_id": b, "quantity": 2 }
            ]
        }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total_amount"], 400);
    assert!(body["created_at"].is_string());
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0]["product_name"], "Kopi");
    assert_eq!(details[0]["subtotal"], 300);
    assert_eq!(details[1]["product_id"], b);
    assert_eq!(details[1]["transaction_id"], body["id"]);

    assert_eq!(server.store.stock_of(a).await, Some(7));
    assert_eq!(server.store.stock_of(b).await, Some(3));
}

#[tokio::test]
async fn test_insufficient_stock_is_conflict() {
    let server = TestServer::start(CheckoutPolicy::default()).await;
    let a = server.store.insert_product("Kopi", 100, 10).id;

    let (status, body) = server
        .post_checkout(json!({ "items": [{ "product_id": a, "quantity": 20 }] }))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(body["details"]["product_id"], a);
    assert_eq!(body["details"]["available"], 10);
    assert_eq!(body["details"]["requested"], 20);
    assert_eq!(server.store.stock_of(a).await, Some(10));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let server = TestServer::start(CheckoutPolicy::default()).await;

    let (status, body) = server
        .post_checkout(json!({ "items": [{ "product_id": 999, "quantity": 1 }] }))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["details"]["product_id"], 999);
}

#[tokio::test]
async fn test_bad_checkout_bodies_are_bad_request() {
    let server = TestServer::start(CheckoutPolicy::default()).await;
    let a = server.store.insert_product("Kopi", 100, 10).id;

    let (status, body) = server.post_checkout(json!({ "items": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = server
        .post_checkout(json!({ "items": [{ "product_id": a, "quantity": 0 }] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post_checkout(json!({ "items": [{ "product_id": "kopi", "quantity": 1 }] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    assert_eq!(server.store.stock_of(a).await, Some(10));
    assert!(server.store.transactions().is_empty());
}

#[tokio::test]
async fn test_empty_cart_commits_when_allowed() {
    let server = TestServer::start(CheckoutPolicy {
        allow_empty_cart: true,
    })
    .await;

    let (status, body) = server.post_checkout(json!({ "items": [] })).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total_amount"], 0);
    assert_eq!(body["details"], json!([]));
}

#[tokio::test]
async fn test_report_without_sales_is_zeroed() {
    let server = TestServer::start(CheckoutPolicy::default()).await;

    let (status, body) = server
        .get("/report?start_date=2026-01-01&end_date=2026-01-31")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "total_revenue": 0,
            "total_transaction_count": 0,
            "best_selling_product": { "name": "", "quantity_sold": 0 }
        })
    );
}

#[tokio::test]
async fn test_report_defaults_to_today() {
    let server = TestServer::start(CheckoutPolicy::default()).await;
    let a = server.store.insert_product("Kopi", 100, 10).id;
    server
        .post_checkout(json!({ "items": [{ "product_id": a, "quantity": 4 }] }))
        .await;

    for path in ["/report", "/report/today"] {
        let (status, body) = server.get(path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_revenue"], 400);
        assert_eq!(body["total_transaction_count"], 1);
        assert_eq!(body["best_selling_product"]["name"], "Kopi");
        assert_eq!(body["best_selling_product"]["quantity_sold"], 4);
    }
}

#[tokio::test]
async fn test_bad_report_bounds_are_bad_request() {
    let server = TestServer::start(CheckoutPolicy::default()).await;

    let (status, body) = server
        .get("/report?start_date=2026-02-10&end_date=2026-02-01")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = server.get("/report?start_date=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start(CheckoutPolicy::default()).await;

    let (status, body) = server.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}
