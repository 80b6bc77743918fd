//! Both routers driven in-process with `tower::ServiceExt::oneshot`.
//!
//! The pools connect lazily and every request here stops before a query,
//! so no database is needed.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use xstore_integration_tests::{admin_test_config, lazy_pool, storefront_test_config};

fn admin_router() -> Router {
    let dir = tempfile::tempdir().unwrap();
    let config = admin_test_config(dir.path().to_path_buf());
    let pool = lazy_pool();
    let sessions = xstore_admin::middleware::create_session_layer(&pool, &config).unwrap();
    let state = xstore_admin::state::AppState::new(config, pool, None);

    xstore_admin::app(&state).layer(sessions).with_state(state)
}

fn storefront_router() -> Router {
    let dir = tempfile::tempdir().unwrap();
    let config = storefront_test_config(dir.path().to_path_buf());
    let pool = lazy_pool();
    let sessions =
        xstore_storefront::middleware::create_session_layer(&pool, &config).unwrap();
    let state = xstore_storefront::state::AppState::new(config, pool);

    xstore_storefront::app(&state).layer(sessions).with_state(state)
}

/// A request from a fixed client address, as the rate limiters key on it.
fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.7");

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_owned()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_admin_health() {
    let response = admin_router()
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_security_headers() {
    let response = admin_router()
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_back_office_requires_sign_in() {
    for (method, uri) in [
        ("GET", "/api/dashboard"),
        ("GET", "/api/products"),
        ("GET", "/api/cities"),
        ("GET", "/api/orders"),
        ("GET", "/api/images"),
        ("GET", "/api/admin-users"),
        ("DELETE", "/api/orders/1"),
    ] {
        let response = admin_router()
            .oneshot(request(method, uri, None))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri}"
        );
    }
}

#[tokio::test]
async fn test_unauthorized_body_is_json() {
    let response = admin_router()
        .oneshot(request("GET", "/api/products", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_otp_requires_sign_in() {
    let response = admin_router()
        .oneshot(request("POST", "/api/auth/otp/send", Some("{}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_info_without_sign_in() {
    let response = admin_router()
        .oneshot(request("GET", "/api/auth/session", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["user"].is_null());
    assert_eq!(body["is_admin"], Value::Bool(false));
}

#[tokio::test]
async fn test_storefront_health() {
    let response = storefront_router()
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_storefront_no_city_selected() {
    let response = storefront_router()
        .oneshot(request("GET", "/api/city", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await.is_null());
}

#[tokio::test]
async fn test_products_need_a_city() {
    let response = storefront_router()
        .oneshot(request("GET", "/api/products", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_storefront_empty_cart() {
    let response = storefront_router()
        .oneshot(request("GET", "/api/cart", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["items"], Value::Array(Vec::new()));
    assert_eq!(body["meets_minimum"], Value::Bool(false));
}

#[tokio::test]
async fn test_checkout_without_city_is_rejected() {
    let details = r#"{"shop_name":"Sharma Stores","phone_number":"9876543210","address":"12 MG Road"}"#;
    let response = storefront_router()
        .oneshot(request("POST", "/api/checkout", Some(details)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
