use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use facturo_rust_ws::create_app_router;
use facturo_rust_ws::domains::invoices::memory::MemoryStore;
use facturo_rust_ws::middleware::SessionClaims;
use facturo_rust_ws::state::{AppState, AuthConfig};

const TEST_SECRET: &str = "test-secret";

fn test_app() -> Router {
    let state = AppState::with_store(
        Arc::new(MemoryStore::new()),
        AuthConfig { jwt_secret: TEST_SECRET.to_string() },
    );
    create_app_router(Arc::new(state))
}

fn bearer(email: &str, name: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: "user-1".to_string(),
        email: email.to_string(),
        name: name.to_string(),
        iat: now,
        exp: now + 3600,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn decimal(value: &Value) -> Decimal {
    // Decimals serialize as strings to preserve precision.
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn health_does_not_require_a_session() {
    let app = test_app();
    let response = app
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_rejects_requests_without_a_bearer_token() {
    let app = test_app();
    let response = app
        .oneshot(request(Method::GET, "/api/invoices", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_rejects_a_garbage_token() {
    let app = test_app();
    let response = app
        .oneshot(request(
            Method::GET,
            "/api/invoices",
            Some("Bearer not-a-jwt"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_without_an_account_row_is_a_distinct_404() {
    let app = test_app();
    let token = bearer("ghost@x.com", "Ghost");
    let response = app
        .oneshot(request(Method::GET, "/api/invoices", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "user_not_found");
}

#[tokio::test]
async fn creating_before_the_user_row_exists_yields_a_null_invoice() {
    let app = test_app();
    let token = bearer("new@x.com", "New User");
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/invoices",
            Some(&token),
            Some(json!({ "name": "First" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["invoice"].is_null());
}

#[tokio::test]
async fn full_invoice_lifecycle_over_http() {
    let app = test_app();
    let token = bearer("a@x.com", "Test");

    // Account row on first sight.
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/users/ensure", Some(&token), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Blank invoice.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/invoices",
            Some(&token),
            Some(json!({ "name": "Test" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let invoice = &body["invoice"];
    let id = invoice["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 6);
    assert_eq!(invoice["vatActive"], false);
    assert_eq!(decimal(&invoice["vatRate"]), Decimal::from(20));
    assert_eq!(invoice["status"], 1);
    assert_eq!(decimal(&invoice["totals"]["subtotal"]), Decimal::ZERO);

    // Save with one line and VAT at 20%.
    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/invoices/{}", id),
            Some(&token),
            Some(json!({
                "issuerName": "Test",
                "issuerAddress": "1 rue de Test",
                "clientName": "Client",
                "clientAddress": "2 rue du Client",
                "invoiceDate": "2025-03-01",
                "dueDate": "2025-04-01",
                "vatActive": true,
                "vatRate": 20,
                "status": 1,
                "lines": [
                    { "id": "tmp-1", "description": "consulting", "quantity": 2, "unitPrice": 10.5 }
                ]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["lines"].as_array().unwrap().len(), 1);
    assert_ne!(body["lines"][0]["id"], "tmp-1");
    assert_eq!(decimal(&body["totals"]["subtotal"]), "21.0".parse().unwrap());
    assert_eq!(decimal(&body["totals"]["vatAmount"]), "4.2".parse().unwrap());
    assert_eq!(decimal(&body["totals"]["grandTotal"]), "25.2".parse().unwrap());

    // Fetch and list both see the saved state.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/api/invoices/{}", id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/invoices", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["invoices"].as_array().unwrap().len(), 1);

    // Delete, then reads report not found.
    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/invoices/{}", id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request(
            Method::GET,
            &format!("/api/invoices/{}", id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_unknown_invoice_is_a_404() {
    let app = test_app();
    let token = bearer("a@x.com", "Test");
    let response = app
        .oneshot(request(
            Method::DELETE,
            "/api/invoices/ffffff",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "invoice_not_found");
}

#[tokio::test]
async fn overdue_pending_invoice_flips_to_unpaid_when_listed() {
    let app = test_app();
    let token = bearer("a@x.com", "Test");

    app.clone()
        .oneshot(request(Method::POST, "/api/users/ensure", Some(&token), Some(json!({}))))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/invoices",
            Some(&token),
            Some(json!({ "name": "Late" })),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    let id = body["invoice"]["id"].as_str().unwrap().to_string();

    // Pending, with a due date long past.
    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/invoices/{}", id),
            Some(&token),
            Some(json!({
                "dueDate": "2020-01-01",
                "status": 2,
                "lines": []
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(Method::GET, "/api/invoices", Some(&token), None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["invoices"][0]["status"], 5);
}
