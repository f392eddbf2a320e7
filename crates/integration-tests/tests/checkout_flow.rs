//! End-to-end checkout flow against a fake Gelato API.
//!
//! Each test runs the storefront and the fake provider in-process on
//! ephemeral ports; no external services are needed.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use clueless_fitness_integration_tests::{SITE_URL, TestContext, serve};
use serde_json::{Value, json};

/// What the fake provider received.
#[derive(Default)]
struct Received {
    orders: Vec<Value>,
    api_keys: Vec<String>,
}

type Shared = Arc<Mutex<Received>>;

/// Fake provider whose `POST /orders` answers with `status` and `reply`.
async fn fake_gelato(status: StatusCode, reply: Value) -> (String, Shared) {
    let received = Shared::default();

    let router = Router::new()
        .route(
            "/orders",
            post(
                move |State(received): State<Shared>, headers: HeaderMap, Json(order): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        let mut received = received.lock().unwrap();
                        if let Some(key) = headers.get("x-api-key") {
                            received.api_keys.push(key.to_str().unwrap().to_string());
                        }
                        received.orders.push(order);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(received.clone());

    (serve(router).await, received)
}

async fn checkout(ctx: &TestContext, details: Value) -> (StatusCode, Option<String>, Value) {
    let response = ctx
        .client
        .post(ctx.url("/checkout"))
        .json(&details)
        .send()
        .await
        .unwrap();
    let status = response.status();
    let redirect = response
        .headers()
        .get("hx-redirect")
        .map(|v| v.to_str().unwrap().to_string());
    (status, redirect, response.json().await.unwrap())
}

fn shipping_details() -> Value {
    json!({
        "shippingAddress": {
            "firstName": "Sam",
            "lastName": "Lifter",
            "addressLine1": "1 Gym Street",
            "city": "Leeds",
            "postalCode": "LS1 1AA",
            "country": "GB"
        },
        "customerInfo": { "email": "sam@cluelessfitness.test" }
    })
}

#[tokio::test]
async fn test_checkout_through_provider() {
    let (gelato_url, received) = fake_gelato(
        StatusCode::OK,
        json!({
            "id": "g-123",
            "status": "pending",
            "checkoutUrl": "https://checkout.gelato.com/orders/g-123"
        }),
    )
    .await;
    let ctx = TestContext::start(&gelato_url, Some("test-key-Xy9")).await;

    ctx.add_to_cart("no-days-off", "M", "black", 2).await;
    ctx.add_to_cart("no-days-off", "L", "navy", 1).await;
    ctx.add_to_cart("no-days-off", "M", "black", 1).await;

    let summary = ctx.cart_summary().await;
    assert_eq!(summary["lines"].as_array().unwrap().len(), 2);
    assert_eq!(summary["totalItems"], 4);
    assert_eq!(summary["totalPrice"], "99.96");

    let (status, redirect, body) = checkout(&ctx, shipping_details()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "provider");
    assert_eq!(body["checkoutUrl"], "https://checkout.gelato.com/orders/g-123");
    assert_eq!(redirect.as_deref(), Some("https://checkout.gelato.com/orders/g-123"));

    {
        let received = received.lock().unwrap();
        assert_eq!(received.orders.len(), 1);
        assert_eq!(received.api_keys, vec!["test-key-Xy9"]);

        let order = &received.orders[0];
        assert_eq!(order["orderReferenceId"], body["orderReference"]);
        assert_eq!(order["billingAddress"], order["shippingAddress"]);
        assert_eq!(order["shippingAddress"]["city"], "Leeds");
        assert_eq!(order["orderItems"][0]["productId"], "tshirt-basic");
        assert_eq!(order["orderItems"][0]["productVariant"], "no-days-off-M-black");
        assert_eq!(order["orderItems"][0]["quantity"], 3);
        assert_eq!(order["orderItems"][1]["productVariant"], "no-days-off-L-navy");
        assert_eq!(
            order["orderItems"][0]["files"][0]["url"],
            format!("{SITE_URL}/teefront2.jpeg")
        );
        assert_eq!(order["orderItems"][0]["files"][0]["type"], "front");
    }

    let summary = ctx.cart_summary().await;
    assert_eq!(summary["totalItems"], 0);
    assert_eq!(summary["isOpen"], false);
}

#[tokio::test]
async fn test_checkout_falls_back_when_provider_fails() {
    let (gelato_url, received) = fake_gelato(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "message": "Something went wrong" }),
    )
    .await;
    let ctx = TestContext::start(&gelato_url, Some("test-key-Xy9")).await;

    ctx.add_to_cart("no-days-off", "M", "black", 2).await;
    let (status, redirect, body) = checkout(&ctx, json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "fallback");
    assert_eq!(received.lock().unwrap().orders.len(), 1);

    let url = redirect.unwrap();
    let reference = body["orderReference"].as_str().unwrap();
    assert!(reference.starts_with("CF-"));
    assert!(url.starts_with("https://www.gelato.com/custom/checkout?"));
    assert!(url.contains(&format!("ref={reference}")));
    assert!(url.contains("product_0=NO+DAYS+OFF"));
    assert!(url.contains("price_0=24.99&quantity_0=2"));

    assert_eq!(ctx.cart_summary().await["totalItems"], 0);
}

#[tokio::test]
async fn test_checkout_without_key_sends_nothing() {
    let (gelato_url, received) = fake_gelato(StatusCode::OK, json!({ "id": "never" })).await;
    let ctx = TestContext::start(&gelato_url, None).await;

    ctx.add_to_cart("no-days-off", "S", "white", 1).await;
    let (_, _, body) = checkout(&ctx, json!({})).await;

    assert_eq!(body["path"], "fallback");
    assert!(received.lock().unwrap().orders.is_empty());
}

#[tokio::test]
async fn test_empty_cart_checkout_is_a_noop() {
    let (gelato_url, received) = fake_gelato(StatusCode::OK, json!({ "id": "never" })).await;
    let ctx = TestContext::start(&gelato_url, Some("test-key-Xy9")).await;

    let response = ctx.client.post(ctx.url("/checkout")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(received.lock().unwrap().orders.is_empty());
}

#[tokio::test]
async fn test_connectivity_check_reports_working_scheme() {
    let provider = Router::new().route(
        "/products",
        get(|headers: HeaderMap| async move {
            let basic = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("Basic "));
            if basic {
                Json(json!([{ "id": "tshirt-basic" }])).into_response()
            } else {
                StatusCode::FORBIDDEN.into_response()
            }
        }),
    );
    let gelato_url = serve(provider).await;
    let ctx = TestContext::start(&gelato_url, Some("test-key-Xy9")).await;

    let body: Value = ctx
        .client
        .get(ctx.url("/api/gelato/test"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["method"], "Authorization Basic");
    assert_eq!(body["productsCount"], 1);
    assert_eq!(body["attempts"].as_array().unwrap().len(), 3);
    assert!(body["timestamp"].as_str().is_some());
}
