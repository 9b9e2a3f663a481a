use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use couponapi_api::app::{router, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over the in-memory store, bound to an ephemeral port.
        let app = router(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn coupons_url(&self) -> String {
        format!("{}/api/coupons", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn coupon_body(code: &str) -> serde_json::Value {
    json!({
        "code": code,
        "description": "Ten percent off",
        "discountValue": 0.8,
        "expirationDate": (Utc::now() + ChronoDuration::days(30)).to_rfc3339(),
        "published": true,
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, code: &str) -> reqwest::Response {
    client
        .post(srv.coupons_url())
        .json(&coupon_body(code))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_returns_created_coupon_with_normalized_code() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, "ABC-123").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], "ABC123");
    assert_eq!(body["description"], "Ten percent off");
    assert_eq!(body["discountValue"], json!(0.8));
    assert_eq!(body["published"], true);
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert!(body.get("status").is_none());
    assert!(body.get("deletedAt").is_none());
}

#[tokio::test]
async fn create_with_short_code_is_rejected_by_business_rule() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, "A-1@3").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(
        body["message"],
        "Invalid coupon code. It must be exactly 6 characters."
    );
}

#[tokio::test]
async fn create_with_missing_fields_reports_field_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.coupons_url())
        .json(&json!({ "code": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"]["code"], "Code is required");
    assert_eq!(body["errors"]["description"], "Description is required");
    assert_eq!(body["errors"]["discountValue"], "Discount value is required");
    assert_eq!(body["errors"]["expirationDate"], "Expiration date is required");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.coupons_url())
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_code_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    assert_eq!(create(&client, &srv, "ABC123").await.status(), StatusCode::CREATED);

    let res = create(&client, &srv, "ABC-123").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Coupon code already exists: ABC123");
}

#[tokio::test]
async fn delete_retires_then_second_delete_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created: serde_json::Value = create(&client, &srv, "ABC123").await.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let res = client
        .delete(format!("{}/{}", srv.coupons_url(), id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(format!("{}/{}", srv.coupons_url(), id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Coupon is already deleted.");
}

#[tokio::test]
async fn delete_unknown_coupon_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .delete(format!("{}/does-not-exist", srv.coupons_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], 404);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "Coupon not found with id: does-not-exist");
}
