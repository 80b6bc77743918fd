//! End-to-end account and approval flow against a running back office.
//!
//! Approval codes go to the approver inbox, so these tests stop short of
//! redeeming one; they cover everything up to that point.
//!
//! ```bash
//! cargo test -p xstore-integration-tests --test admin_api -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use xstore_integration_tests::{admin_base_url, client, unique_email};

const PASSWORD: &str = "near-expiry-stock-2026";

async fn sign_up(client: &reqwest::Client, email: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/auth/sign-up", admin_base_url()))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_health() {
    let response = client()
        .get(format!("{}/health", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_sign_up_gives_account_without_admin_access() {
    let client = client();
    let email = unique_email("signup");

    let response = sign_up(&client, &email).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let session: Value = client
        .get(format!("{}/api/auth/session", admin_base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["user"]["email"], email.as_str());
    assert_eq!(session["is_admin"], false);

    let response = client
        .get(format!("{}/api/products", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_duplicate_sign_up_is_rejected() {
    let email = unique_email("dup");
    assert_eq!(sign_up(&client(), &email).await.status(), StatusCode::CREATED);
    assert_eq!(sign_up(&client(), &email).await.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_weak_password_is_rejected() {
    let response = client()
        .post(format!("{}/api/auth/sign-up", admin_base_url()))
        .json(&json!({ "email": unique_email("weak"), "password": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_password_is_rejected() {
    let email = unique_email("wrongpw");
    sign_up(&client(), &email).await;

    let response = client()
        .post(format!("{}/api/auth/sign-in", admin_base_url()))
        .json(&json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_approval_code_is_rejected() {
    let client = client();
    sign_up(&client, &unique_email("otp")).await;

    let sent: Value = client
        .post(format!("{}/api/auth/otp/send", admin_base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(sent["expires_at"].is_string());

    // A fresh code is six random digits; all-zero is as good a wrong guess
    // as any, with a one in a million chance of being right.
    let response = client
        .post(format!("{}/api/auth/otp/verify", admin_base_url()))
        .json(&json!({ "code": "000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_sign_out_ends_session() {
    let client = client();
    sign_up(&client, &unique_email("signout")).await;

    let response = client
        .post(format!("{}/api/auth/sign-out", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/api/dashboard", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
