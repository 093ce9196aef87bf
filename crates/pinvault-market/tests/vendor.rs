//! Drives the marketplace client against a fake vendor served by axum on a local port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pinvault_market::{
    MarketConfig, MarketEnv, MarketError, Marketplace, MarketplaceClient, PriceAggregator,
};
use serde_json::json;

#[derive(Default)]
struct Vendor {
    token_calls: AtomicUsize,
    fail_search: bool,
    reject_auth: bool,
    last_query: Mutex<HashMap<String, String>>,
    last_marketplace: Mutex<Option<String>>,
}

async fn token(State(vendor): State<Arc<Vendor>>, headers: HeaderMap) -> Response {
    vendor.token_calls.fetch_add(1, Ordering::SeqCst);
    let basic = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if vendor.reject_auth || !basic {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"access_token": "vendor-token", "expires_in": 7200, "token_type": "Application Access Token"}))
        .into_response()
}

async fn sold(
    State(vendor): State<Arc<Vendor>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer vendor-token") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    *vendor.last_marketplace.lock().unwrap() = headers
        .get("x-ebay-c-marketplace-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *vendor.last_query.lock().unwrap() = params;

    if vendor.fail_search {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({
        "total": 4,
        "itemSummaries": [
            {"itemId": "a", "title": "Stitch", "price": {"value": "30.00", "currency": "USD"},
             "itemEndDate": "2024-04-03T00:00:00.000Z"},
            {"itemId": "b", "title": "Stitch", "price": {"value": "10.00", "currency": "USD"},
             "itemEndDate": "2024-04-01T00:00:00.000Z"},
            {"itemId": "c", "title": "Stitch", "price": {"value": "20.00", "currency": "USD"}},
            {"itemId": "d", "title": "Stitch", "price": {"value": "offer", "currency": "USD"},
             "itemEndDate": "2024-04-02T00:00:00.000Z"}
        ]
    }))
    .into_response()
}

async fn browse(
    State(vendor): State<Arc<Vendor>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    *vendor.last_query.lock().unwrap() = params;
    Json(json!({
        "total": 1,
        "itemSummaries": [
            {"itemId": "v1|9|0", "title": "Disney Jafar Villain Pin",
             "price": {"value": "18.99", "currency": "USD"},
             "image": {"imageUrl": "https://img/jafar.jpg"}}
        ]
    }))
    .into_response()
}

async fn spawn_vendor(vendor: Vendor) -> (Arc<Vendor>, String) {
    let vendor = Arc::new(vendor);
    let app = Router::new()
        .route("/identity/v1/oauth2/token", post(token))
        .route("/buy/marketplace_insights/v1_beta/item_sales/search", get(sold))
        .route("/buy/browse/v1/item_summary/search", get(browse))
        .with_state(vendor.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (vendor, format!("http://{addr}"))
}

fn client(base: &str) -> MarketplaceClient {
    let mut config = MarketConfig::new(MarketEnv::Sandbox, "app-id".into(), "cert-id".into());
    config.api_base = base.to_string();
    config.auth_base = base.to_string();
    MarketplaceClient::from_config(config).unwrap()
}

#[tokio::test]
async fn search_sends_qualified_query_and_reuses_token() {
    let (vendor, base) = spawn_vendor(Vendor::default()).await;
    let client = client(&base);

    let items = client.search("Stitch", 20, &[("filter", "soldItems:true")]).await;
    assert_eq!(items.len(), 4);
    client.search("Stitch", 20, &[]).await;

    assert_eq!(vendor.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(vendor.last_marketplace.lock().unwrap().as_deref(), Some("EBAY_US"));

    let query = vendor.last_query.lock().unwrap().clone();
    assert_eq!(query.get("q").map(String::as_str), Some("Disney Pin Stitch"));
    assert_eq!(query.get("limit").map(String::as_str), Some("20"));
    assert_eq!(query.get("category_ids").map(String::as_str), Some("50310"));
}

#[tokio::test]
async fn server_error_fails_open() {
    let (_vendor, base) = spawn_vendor(Vendor {
        fail_search: true,
        ..Default::default()
    })
    .await;
    let client = client(&base);

    assert!(client.search("Stitch", 20, &[]).await.is_empty());
    match client.try_search("Stitch", 20, &[]).await {
        Err(MarketError::Status(status)) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_credentials_fail_open() {
    let (_vendor, base) = spawn_vendor(Vendor {
        reject_auth: true,
        ..Default::default()
    })
    .await;
    let client = client(&base);

    assert!(client.search("Stitch", 20, &[]).await.is_empty());
    assert!(matches!(client.try_search("Stitch", 20, &[]).await, Err(MarketError::Auth(_))));
}

#[tokio::test]
async fn unreachable_vendor_fails_open() {
    // Bind then drop so the port is very likely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client(&base);
    assert!(client.browse("Stitch", 5).await.is_empty());
}

#[tokio::test]
async fn browse_requests_extended_fields() {
    let (vendor, base) = spawn_vendor(Vendor::default()).await;
    let client = client(&base);

    let items = client.browse("Jafar", 10).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].image_url.as_deref(), Some("https://img/jafar.jpg"));

    let query = vendor.last_query.lock().unwrap().clone();
    assert_eq!(query.get("fieldgroups").map(String::as_str), Some("EXTENDED"));
    assert_eq!(query.get("q").map(String::as_str), Some("Disney Pin Jafar"));
}

#[tokio::test]
async fn aggregator_over_live_search() {
    let (vendor, base) = spawn_vendor(Vendor::default()).await;
    let prices = PriceAggregator::new(Arc::new(client(&base)));

    assert_eq!(prices.average_price("Stitch").await, 20.0);
    assert_eq!(
        vendor.last_query.lock().unwrap().get("filter").map(String::as_str),
        Some("soldItems:true")
    );

    let history = prices.price_history("Stitch").await;
    let points: Vec<f64> = history.iter().map(|p| p.price).collect();
    assert_eq!(points, vec![10.0, 30.0]);
    assert_eq!(
        vendor.last_query.lock().unwrap().get("limit").map(String::as_str),
        Some("30")
    );
}
