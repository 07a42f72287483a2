//! Wire-level tests driving the router directly, no listener involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use coffer_nullables::{NullClock, NullStore};
use coffer_rpc::create_router;
use coffer_service::{CofferService, GenesisReserve, ServiceConfig};
use coffer_types::RATE_SCALE;
use serde_json::{json, Value};
use tower::ServiceExt;

const ONE_PCT_PER_SEC: u64 = (RATE_SCALE / 100) as u64;

fn test_router() -> Router {
    let config = ServiceConfig {
        initial_rate: ONE_PCT_PER_SEC,
        owner: Some("cfr_admin".to_string()),
        genesis_reserves: vec![GenesisReserve {
            address: "cfr_alice".to_string(),
            amount: "1000000".to_string(),
        }],
        ..ServiceConfig::default()
    };
    let gate = Arc::new(config.role_table().expect("role table"));
    let service = CofferService::open(
        &config,
        Arc::new(NullStore::new()),
        gate,
        Arc::new(NullClock::new(0)),
    )
    .expect("open");
    create_router(Arc::new(service))
}

async fn call(router: Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn deposit_then_read_account() {
    let router = test_router();

    let (status, body) = call(
        router.clone(),
        "POST",
        "/deposit",
        Some(json!({"holder": "cfr_alice", "amount": "250000"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deposited"], "250000");
    assert_eq!(body["interest_realized"], "0");
    assert_eq!(body["locked_rate"], ONE_PCT_PER_SEC.to_string());

    let (status, body) = call(router, "GET", "/account/cfr_alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "250000");
    assert_eq!(body["principal"], "250000");
    assert_eq!(body["locked_rate"], ONE_PCT_PER_SEC.to_string());
    assert_eq!(body["reserve_balance"], "750000");
}

#[tokio::test]
async fn unseen_account_reads_as_zero_with_null_rate() {
    let router = test_router();

    let (status, body) = call(router, "GET", "/account/cfr_nobody", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "0");
    assert_eq!(body["locked_rate"], Value::Null);
    assert_eq!(body["reserve_balance"], "0");
}

#[tokio::test]
async fn max_sentinel_redeems_the_whole_balance() {
    let router = test_router();

    call(
        router.clone(),
        "POST",
        "/deposit",
        Some(json!({"holder": "cfr_alice", "amount": "1000"})),
    )
    .await;
    let (status, body) = call(
        router.clone(),
        "POST",
        "/redeem",
        Some(json!({"holder": "cfr_alice", "amount": "max"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redeemed"], "1000");

    let (_, body) = call(router, "GET", "/account/cfr_alice", None).await;
    assert_eq!(body["balance"], "0");
    assert_eq!(body["reserve_balance"], "1000000");
}

#[tokio::test]
async fn overdrawn_redeem_is_a_conflict() {
    let router = test_router();

    call(
        router.clone(),
        "POST",
        "/deposit",
        Some(json!({"holder": "cfr_alice", "amount": "100"})),
    )
    .await;
    let (status, body) = call(
        router,
        "POST",
        "/redeem",
        Some(json!({"holder": "cfr_alice", "amount": "200"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_BALANCE");
}

#[tokio::test]
async fn malformed_amount_is_a_bad_request() {
    let router = test_router();

    let (status, body) = call(
        router,
        "POST",
        "/deposit",
        Some(json!({"holder": "cfr_alice", "amount": "12abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn unprefixed_address_is_a_bad_request() {
    let router = test_router();

    let (status, body) = call(
        router,
        "POST",
        "/deposit",
        Some(json!({"holder": "alice", "amount": "10"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn mint_without_capability_is_forbidden() {
    let router = test_router();

    let (status, body) = call(
        router,
        "POST",
        "/mint",
        Some(json!({"caller": "cfr_bob", "to": "cfr_bob", "amount": "10"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn owner_can_mint_and_burn() {
    let router = test_router();

    let (status, body) = call(
        router.clone(),
        "POST",
        "/mint",
        Some(json!({"caller": "cfr_admin", "to": "cfr_bob", "amount": "500"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["minted"], "500");

    let (status, body) = call(
        router,
        "POST",
        "/burn",
        Some(json!({"caller": "cfr_admin", "from": "cfr_bob", "amount": "max"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["burned"], "500");
}

#[tokio::test]
async fn rate_endpoint_reads_and_lowers() {
    let router = test_router();

    let (status, body) = call(router.clone(), "GET", "/rate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rate"], ONE_PCT_PER_SEC.to_string());

    let lowered = (ONE_PCT_PER_SEC / 2).to_string();
    let (status, body) = call(
        router.clone(),
        "POST",
        "/rate",
        Some(json!({"caller": "cfr_admin", "rate": lowered})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previous"], ONE_PCT_PER_SEC.to_string());
    assert_eq!(body["current"], lowered);

    // Raising it back is rejected.
    let (status, body) = call(
        router.clone(),
        "POST",
        "/rate",
        Some(json!({"caller": "cfr_admin", "rate": ONE_PCT_PER_SEC.to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "RATE_CHANGE_REJECTED");

    let (_, body) = call(router, "GET", "/rate", None).await;
    assert_eq!(body["rate"], lowered);
}

#[tokio::test]
async fn allowance_flow_over_the_wire() {
    let router = test_router();

    call(
        router.clone(),
        "POST",
        "/deposit",
        Some(json!({"holder": "cfr_alice", "amount": "1000"})),
    )
    .await;
    let (status, body) = call(
        router.clone(),
        "POST",
        "/approve",
        Some(json!({"owner": "cfr_alice", "spender": "cfr_bob", "amount": "400"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowance"], "400");

    let (status, body) = call(
        router.clone(),
        "POST",
        "/transfer_from",
        Some(json!({
            "spender": "cfr_bob",
            "from": "cfr_alice",
            "to": "cfr_carol",
            "amount": "300"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], "300");

    let (status, body) = call(
        router,
        "POST",
        "/transfer_from",
        Some(json!({
            "spender": "cfr_bob",
            "from": "cfr_alice",
            "to": "cfr_carol",
            "amount": "300"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALLOWANCE_EXCEEDED");
}

#[tokio::test]
async fn summary_totals_after_activity() {
    let router = test_router();

    call(
        router.clone(),
        "POST",
        "/deposit",
        Some(json!({"holder": "cfr_alice", "amount": "600000"})),
    )
    .await;
    call(
        router.clone(),
        "POST",
        "/transfer",
        Some(json!({"from": "cfr_alice", "to": "cfr_bob", "amount": "100000"})),
    )
    .await;

    let (status, body) = call(router, "GET", "/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["holders"], 2);
    assert_eq!(body["total_principal"], "600000");
    assert_eq!(body["global_rate"], ONE_PCT_PER_SEC.to_string());
    assert_eq!(body["vault_reserve"], "600000");
}
