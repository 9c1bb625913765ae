//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::config::Config;
use api::routes::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use composer::PARTICIPATION_FAILED;
use metrics_exporter_prometheus::PrometheusHandle;
use services::DEMO_CUSTOMER;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    setup_with_state().0
}

fn setup_with_state() -> (axum::Router, Arc<AppState>) {
    let state = api::create_default_state(&Config::default()).unwrap();
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> axum::body::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn checkout_body(customer_id: uuid::Uuid, product_id: u32, quantity: u32) -> serde_json::Value {
    serde_json::json!({
        "order_id": uuid::Uuid::new_v4(),
        "customer_id": customer_id,
        "address_id": uuid::Uuid::new_v4(),
        "items": [{
            "product_id": product_id,
            "purchase_price_cents": 4999,
            "quantity": quantity
        }]
    })
}

#[tokio::test]
async fn test_liveness() {
    let response = get(setup(), "/livez").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_search_returns_enriched_products() {
    let response = get(setup(), "/products?searchTerm=abc").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let products = json.as_array().unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[1]["name"], "Twinings English Breakfast Tea Bags");
    assert_eq!(products[1]["current_price_cents"], 149);
    assert_eq!(products[1]["average_review"], 5);
    assert_eq!(products[1]["stock_level"], 2_934_830);
}

#[tokio::test]
async fn test_search_without_matches_returns_empty_list() {
    let response = get(setup(), "/products?searchTerm=xyz").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_search_requires_term() {
    let response = get(setup(), "/products").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_by_id() {
    let response = get(setup(), "/product/123").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "My first product");
    assert_eq!(json["current_price_cents"], 1212);
    assert_eq!(json["reviews"].as_array().unwrap().len(), 3);
    assert_eq!(json["reviews"][0]["comment"], "Really good!");
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let response = get(setup(), "/product/9").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_checkout_completes() {
    let (app, state) = setup_with_state();

    let response = post_json(app, "/checkout/complete", checkout_body(DEMO_CUSTOMER, 3, 1)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["customer_name"], "Ada Lovelace");
    assert_eq!(json["reservation_id"], "RES-0001");
    assert_eq!(state.services.warehouse.reservation_count(), 1);
    assert_eq!(state.services.warehouse.stock_level(3), 392);
}

#[tokio::test]
async fn test_checkout_for_unknown_customer_is_compensated() {
    let (app, state) = setup_with_state();

    let response = post_json(
        app,
        "/checkout/complete",
        checkout_body(uuid::Uuid::new_v4(), 3, 1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], PARTICIPATION_FAILED);
    assert_eq!(state.services.warehouse.reservation_count(), 0);
    assert_eq!(state.services.warehouse.released_count(), 1);
    assert_eq!(state.services.warehouse.stock_level(3), 393);
}

#[tokio::test]
async fn test_checkout_with_insufficient_stock_fails() {
    let (app, state) = setup_with_state();

    let response = post_json(
        app,
        "/checkout/complete",
        checkout_body(DEMO_CUSTOMER, 3, 1_000),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.services.customers.rollback_count(), 1);
    assert_eq!(state.services.warehouse.reservation_count(), 0);
}

#[tokio::test]
async fn test_configuration_lists_participators() {
    let response = get(setup(), "/composer/configuration").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(html.contains("<table>"));
    assert!(html.contains("ProductsBySearchTermRequest"));
    assert!(html.contains("SearchSkeletonParticipator"));
    assert!(html.contains("ReserveStockParticipator"));
    assert!(!html.contains("NO IMPLEMENTATIONS"));
}

#[tokio::test]
async fn test_metrics_after_composition() {
    let (app, _) = setup_with_state();

    let response = get(app.clone(), "/products?searchTerm=abc").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app, "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(text.contains("compositions_total"));
}
