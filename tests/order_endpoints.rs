//! Integration tests for the order endpoints.
//!
//! # Tests Covered
//!
//! - order placement, total computation and cart clearing
//! - client-supplied and catalog pricing
//! - admin and per-user listings
//! - status updates and their validation
//! - a cart store failure after the order is committed

mod common;

use axum::http::{Method, StatusCode};
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use common::{
    ADMIN_TOKEN, OTHER_USER_TOKEN, USER_ID, USER_TOKEN, create_test_context,
    create_test_context_with_pricing, create_test_state_with_failing_cart_writes, empty_request,
    json_request, save_product, send,
};
use storefront_api::api::AppState;
use storefront_api::domain::{Cart, CartItem, OrderId, PricingPolicy, ProductId, UserId};
use storefront_api::infrastructure::OrderRepository;

fn customer_info() -> Value {
    json!({ "name": "Ada Lovelace", "address": "12 St James's Square", "phone": "555-0100" })
}

async fn place_order(state: &AppState, token: &str, items: Value) -> (StatusCode, Value) {
    send(
        state,
        json_request(
            Method::POST,
            "/api/orders",
            Some(token),
            &json!({ "customerInfo": customer_info(), "items": items }),
        ),
    )
    .await
}

async fn add_to_cart(state: &AppState, product_id: ProductId, quantity: u32) {
    let (status, _) = send(
        state,
        json_request(
            Method::POST,
            "/api/cart",
            Some(USER_TOKEN),
            &json!({ "productId": product_id.to_string(), "quantity": quantity }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// POST /api/orders Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn placing_order_computes_total_and_empties_cart() {
    let context = create_test_context();
    let product = save_product(&context.state, "Desk Lamp", Decimal::from(10), 5).await;
    add_to_cart(&context.state, product.product_id, 2).await;

    let (status, body) = place_order(
        &context.state,
        USER_TOKEN,
        json!([{
            "productId": { "_id": product.product_id.to_string(), "price": 10 },
            "quantity": 2
        }]),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total"].as_f64(), Some(20.0));
    assert_eq!(body["status"], json!("pending"));
    assert_eq!(body["userId"], json!(USER_ID));
    assert_eq!(body["items"][0]["productId"], json!(product.product_id.to_string()));
    assert_eq!(body["customerInfo"], customer_info());

    let (status, cart) = send(&context.state, empty_request(Method::GET, "/api/cart", Some(USER_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"], json!([]));
}

#[rstest]
#[tokio::test]
async fn total_is_sum_of_quantity_times_price() {
    let context = create_test_context();

    let (status, body) = place_order(
        &context.state,
        USER_TOKEN,
        json!([
            { "productId": ProductId::generate().to_string(), "quantity": 2, "price": 10 },
            { "productId": ProductId::generate().to_string(), "quantity": 4, "price": 2.5 }
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total"].as_f64(), Some(30.0));

    let order_id = OrderId::parse(body["_id"].as_str().unwrap()).unwrap();
    let stored = context
        .state
        .order_repository
        .find_by_id(&order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total, Decimal::from(30));
}

#[rstest]
#[tokio::test]
async fn empty_item_list_is_rejected_and_nothing_is_stored() {
    let context = create_test_context();

    let (status, body) = place_order(&context.state, USER_TOKEN, json!([])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Cart is empty"));
    assert!(context.state.order_repository.find_all().await.unwrap().is_empty());
}

#[rstest]
#[case(json!({ "customerInfo": customer_info() }))]
#[case(json!({ "customerInfo": customer_info(), "items": null }))]
#[tokio::test]
async fn absent_or_null_items_are_treated_as_empty(#[case] body: Value) {
    let context = create_test_context();

    let (status, body) = send(
        &context.state,
        json_request(Method::POST, "/api/orders", Some(USER_TOKEN), &body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Cart is empty"));
}

#[rstest]
#[case(json!({ "items": [{ "productId": "64b7f0c2a1b2c3d4e5f60718", "quantity": 1, "price": 1 }] }))]
#[case(json!({
    "customerInfo": { "name": "Ada", "address": "", "phone": "555" },
    "items": [{ "productId": "64b7f0c2a1b2c3d4e5f60718", "quantity": 1, "price": 1 }]
}))]
#[case(json!({
    "customerInfo": { "name": "Ada", "address": "Loop Road", "phone": "555" },
    "items": [{ "productId": "64b7f0c2a1b2c3d4e5f60718", "quantity": 0, "price": 1 }]
}))]
#[case(json!({
    "customerInfo": { "name": "Ada", "address": "Loop Road", "phone": "555" },
    "items": [{ "productId": "64b7f0c2a1b2c3d4e5f60718", "quantity": 1 }]
}))]
#[case(json!({
    "customerInfo": { "name": "Ada", "address": "Loop Road", "phone": "555" },
    "items": [{ "productId": "bogus", "quantity": 1, "price": 1 }]
}))]
#[case(json!({
    "customerInfo": { "name": "Ada", "address": "Loop Road", "phone": "555" },
    "items": [{ "productId": "64b7f0c2a1b2c3d4e5f60718", "price": 1 }]
}))]
#[case(json!({
    "customerInfo": { "name": "Ada", "address": "Loop Road", "phone": "555" },
    "items": [{ "productId": "64b7f0c2a1b2c3d4e5f60718", "quantity": "2", "price": 1 }]
}))]
#[tokio::test]
async fn incomplete_order_is_bad_request(#[case] body: Value) {
    let context = create_test_context();

    let (status, _) = send(
        &context.state,
        json_request(Method::POST, "/api/orders", Some(USER_TOKEN), &body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(context.state.order_repository.find_all().await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn catalog_pricing_ignores_client_prices() {
    let context = create_test_context_with_pricing(PricingPolicy::Catalog);
    let product = save_product(&context.state, "Desk Lamp", Decimal::from(15), 5).await;

    let (status, body) = place_order(
        &context.state,
        USER_TOKEN,
        json!([{ "productId": product.product_id.to_string(), "quantity": 2, "price": 1 }]),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total"].as_f64(), Some(30.0));
    assert_eq!(body["items"][0]["price"].as_f64(), Some(15.0));
}

#[rstest]
#[tokio::test]
async fn catalog_pricing_rejects_unknown_products() {
    let context = create_test_context_with_pricing(PricingPolicy::Catalog);

    let (status, _) = place_order(
        &context.state,
        USER_TOKEN,
        json!([{ "productId": ProductId::generate().to_string(), "quantity": 1 }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn cart_clear_failure_keeps_committed_order() {
    let product_id = ProductId::generate();
    let cart = Cart::empty(UserId::new(USER_ID))
        .add_item(CartItem::new(product_id, 1).unwrap())
        .unwrap();
    let state = create_test_state_with_failing_cart_writes(&[cart]).await;

    let (status, _) = place_order(
        &state,
        USER_TOKEN,
        json!([{ "productId": product_id.to_string(), "quantity": 1, "price": 3 }]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let orders = state.order_repository.find_all().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total, Decimal::from(3));
}

#[rstest]
#[tokio::test]
async fn placing_order_requires_authentication() {
    let context = create_test_context();

    let (status, _) = send(
        &context.state,
        json_request(
            Method::POST,
            "/api/orders",
            None,
            &json!({ "customerInfo": customer_info(), "items": [] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// GET /api/orders and /api/orders/my-orders Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn my_orders_returns_only_callers_orders_oldest_first() {
    let context = create_test_context();
    let product = save_product(&context.state, "Desk Lamp", Decimal::from(10), 5).await;
    let item = |price: u32| {
        json!([{ "productId": product.product_id.to_string(), "quantity": 1, "price": price }])
    };

    let (_, first) = place_order(&context.state, USER_TOKEN, item(1)).await;
    place_order(&context.state, OTHER_USER_TOKEN, item(2)).await;
    let (_, second) = place_order(&context.state, USER_TOKEN, item(3)).await;

    let (status, body) = send(
        &context.state,
        empty_request(Method::GET, "/api/orders/my-orders", Some(USER_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["_id"], first["_id"]);
    assert_eq!(orders[1]["_id"], second["_id"]);
    assert_eq!(orders[0]["items"][0]["productId"]["name"], json!("Desk Lamp"));
}

#[rstest]
#[tokio::test]
async fn admin_lists_every_order() {
    let context = create_test_context();
    let item = json!([{ "productId": ProductId::generate().to_string(), "quantity": 1, "price": 1 }]);
    place_order(&context.state, USER_TOKEN, item.clone()).await;
    place_order(&context.state, OTHER_USER_TOKEN, item).await;

    let (status, body) = send(&context.state, empty_request(Method::GET, "/api/orders", Some(ADMIN_TOKEN))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[rstest]
#[case(None, StatusCode::UNAUTHORIZED)]
#[case(Some(USER_TOKEN), StatusCode::FORBIDDEN)]
#[tokio::test]
async fn listing_all_orders_requires_admin(#[case] token: Option<&str>, #[case] expected: StatusCode) {
    let context = create_test_context();

    let (status, _) = send(&context.state, empty_request(Method::GET, "/api/orders", token)).await;

    assert_eq!(status, expected);
}

// =============================================================================
// PUT /api/orders/{id}/status Tests
// =============================================================================

async fn placed_order_id(state: &AppState) -> String {
    let (status, body) = place_order(
        state,
        USER_TOKEN,
        json!([{ "productId": ProductId::generate().to_string(), "quantity": 1, "price": 1 }]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["_id"].as_str().unwrap().to_string()
}

async fn set_status(state: &AppState, order_id: &str, token: &str, status: &str) -> (StatusCode, Value) {
    send(
        state,
        json_request(
            Method::PUT,
            &format!("/api/orders/{order_id}/status"),
            Some(token),
            &json!({ "status": status }),
        ),
    )
    .await
}

#[rstest]
#[case("completed")]
#[case("cancelled")]
#[case("pending")]
#[tokio::test]
async fn admin_sets_known_status(#[case] new_status: &str) {
    let context = create_test_context();
    let order_id = placed_order_id(&context.state).await;

    let (status, body) = set_status(&context.state, &order_id, ADMIN_TOKEN, new_status).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!(new_status));
}

#[rstest]
#[tokio::test]
async fn unknown_status_is_rejected_and_order_unchanged() {
    let context = create_test_context();
    let order_id = placed_order_id(&context.state).await;

    let (status, _) = set_status(&context.state, &order_id, ADMIN_TOKEN, "shipped").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stored = context
        .state
        .order_repository
        .find_by_id(&OrderId::parse(&order_id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status.as_str(), "pending");
}

#[rstest]
#[tokio::test]
async fn terminal_status_can_be_left() {
    let context = create_test_context();
    let order_id = placed_order_id(&context.state).await;

    set_status(&context.state, &order_id, ADMIN_TOKEN, "cancelled").await;
    let (status, body) = set_status(&context.state, &order_id, ADMIN_TOKEN, "pending").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("pending"));
}

#[rstest]
#[tokio::test]
async fn status_update_on_unknown_order_is_not_found() {
    let context = create_test_context();

    let (status, body) =
        set_status(&context.state, &OrderId::generate().to_string(), ADMIN_TOKEN, "completed").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Order not found"));
}

#[rstest]
#[tokio::test]
async fn status_update_with_malformed_id_is_bad_request() {
    let context = create_test_context();

    let (status, _) = set_status(&context.state, "not-an-id", ADMIN_TOKEN, "completed").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn status_update_by_regular_user_is_forbidden() {
    let context = create_test_context();
    let order_id = placed_order_id(&context.state).await;

    let (status, _) = set_status(&context.state, &order_id, USER_TOKEN, "completed").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
