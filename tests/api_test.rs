//! HTTP API Integration Tests
//!
//! Exercises the router in-process with `tower::ServiceExt::oneshot`, backed
//! by the in-memory wallet and contract.

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use bank_dapp::api::create_router;
use bank_dapp::{BankConfig, SessionController};
use common::{address, ether, TestEnvironment, CUSTOMER, OWNER};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("valid request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let env = TestEnvironment::new(CUSTOMER);
    let app = create_router(env.session.clone());

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_mount_returns_snapshot() {
    let env = TestEnvironment::new(OWNER);
    let app = create_router(env.session.clone());

    let (status, body) = send(&app, Method::POST, "/api/session/mount", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["connected"], true);
    assert_eq!(body["session"]["connection"]["status"], "connected");
    assert_eq!(body["session"]["is_owner"], true);
    assert_eq!(body["session"]["bank_name"], "");
}

#[tokio::test]
async fn test_mount_without_provider_reports_prompt() {
    let config = BankConfig::default();
    let app = create_router(Arc::new(SessionController::without_provider(&config)));

    let (status, body) = send(&app, Method::POST, "/api/session/mount", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["connected"], false);
    assert_eq!(body["session"]["error"]["kind"], "missing_provider");
    assert_eq!(body["session"]["error"]["message"], config.install_prompt);

    let (status, body) = send(&app, Method::POST, "/api/session/connect", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "missing_provider");
}

#[tokio::test]
async fn test_balance_requires_connection() {
    let env = TestEnvironment::new(CUSTOMER);
    let app = create_router(env.session.clone());

    let (status, body) = send(&app, Method::GET, "/api/bank/balance", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "not_connected");
}

#[tokio::test]
async fn test_deposit_via_form_submission() {
    let env = TestEnvironment::new(CUSTOMER);
    let app = create_router(env.session.clone());
    send(&app, Method::POST, "/api/session/connect", None).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/session/inputs",
        Some(json!({ "field": "deposit", "value": "1.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inputs"]["deposit"], "1.5");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/session/inputs/deposit/submit",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["operation"], "deposit");
    assert_eq!(body["session"]["inputs"]["deposit"], "");
    assert_eq!(
        body["session"]["balance_wei"],
        ether("1.5").to_string()
    );
    assert_eq!(env.ledger.balance_of(address(CUSTOMER)).await, ether("1.5"));
}

#[tokio::test]
async fn test_unknown_field_is_bad_request() {
    let env = TestEnvironment::new(CUSTOMER);
    let app = create_router(env.session.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/session/inputs/amount/submit",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_rename_and_read_back() {
    let env = TestEnvironment::new(OWNER);
    let app = create_router(env.session.clone());
    send(&app, Method::POST, "/api/session/mount", None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bank/name",
        Some(json!({ "name": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["bank_name"], "Acme");

    let (status, body) = send(&app, Method::GET, "/api/bank/name", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Acme");
}

#[tokio::test]
async fn test_overdrawn_withdraw_is_bad_gateway() {
    let env = TestEnvironment::new(CUSTOMER);
    let app = create_router(env.session.clone());
    send(&app, Method::POST, "/api/session/mount", None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bank/withdraw",
        Some(json!({ "amount": "10" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "remote_call");

    let (_, session) = send(&app, Method::GET, "/api/session", None).await;
    assert_eq!(session["error"]["operation"], "withdraw");
    assert_eq!(session["balance_wei"], "0");
}

#[tokio::test]
async fn test_owner_endpoint() {
    let env = TestEnvironment::new(CUSTOMER);
    let app = create_router(env.session.clone());
    send(&app, Method::POST, "/api/session/connect", None).await;

    let (status, body) = send(&app, Method::GET, "/api/bank/owner", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_owner"], false);
    let owner: ethers::types::Address =
        serde_json::from_value(body["owner"].clone()).expect("address");
    assert_eq!(owner, address(OWNER));
}
