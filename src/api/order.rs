//! Order handlers.
//!
//! # Handlers
//!
//! - `POST /api/orders`: place an order and empty the caller's cart
//! - `GET /api/orders`: every order (admin)
//! - `GET /api/orders/my-orders`: the caller's orders
//! - `PUT /api/orders/{id}/status`: change an order's status (admin)

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use rust_decimal::Decimal;

use super::dto::{
    CreateOrderRequest, CustomerInfoDto, OrderItemRequest, OrderResponse, UpdateStatusRequest,
    referenced_products,
};
use super::error::ApiErrorResponse;
use super::identity::{AdminCaller, Caller};
use super::populate::ProductLookup;
use super::state::AppState;
use crate::domain::{
    CustomerInfo, DomainError, Order, OrderId, OrderLineItem, OrderStatus, PricingPolicy,
    ProductId, Timestamp,
};

// =============================================================================
// POST /api/orders Handler
// =============================================================================

/// Places an order for the caller.
///
/// The order is stored first. The caller's cart is then emptied; if that
/// second write fails the order stays placed and the request reports 500.
///
/// # Request Body
///
/// ```json
/// {
///   "customerInfo": { "name": "…", "address": "…", "phone": "…" },
///   "items": [{ "productId": "<24 hex>", "quantity": 2, "price": 10 }]
/// }
/// ```
///
/// # Errors
///
/// - 400 when `items` is empty (`Cart is empty`)
/// - 400 when customer info or an item is incomplete or malformed
/// - 500 when the order or the cart cannot be written
pub async fn create_order(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiErrorResponse> {
    let Json(request) = body?;
    if request.items().is_empty() {
        return Err(DomainError::EmptyOrder.into());
    }

    let customer_info = customer_info_from_request(request.customer_info.as_ref())?;
    let line_items = price_line_items(&state, request.items()).await?;
    let order = Order::place(
        OrderId::generate(),
        caller.user_id.clone(),
        line_items,
        customer_info,
        Timestamp::now(),
    )?;

    state.order_repository.save(&order).await?;
    tracing::info!(
        order_id = %order.order_id,
        user_id = %order.user_id,
        total = %order.total,
        pricing = state.pricing_policy.as_str(),
        "Order placed"
    );

    clear_cart(&state, &order).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse::from_order(&order, &ProductLookup::empty())),
    ))
}

// =============================================================================
// Listing Handlers
// =============================================================================

/// Lists every order, oldest first, with products inlined.
///
/// # Errors
///
/// Returns 500 when the store cannot be read.
pub async fn list_orders(
    State(state): State<AppState>,
    AdminCaller(_): AdminCaller,
) -> Result<Json<Vec<OrderResponse>>, ApiErrorResponse> {
    let orders = state.order_repository.find_all().await?;
    populated(&state, &orders).await.map(Json)
}

/// Lists the caller's orders, oldest first, with products inlined.
///
/// # Errors
///
/// Returns 500 when the store cannot be read.
pub async fn my_orders(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<OrderResponse>>, ApiErrorResponse> {
    let orders = state.order_repository.find_by_user(&caller.user_id).await?;
    populated(&state, &orders).await.map(Json)
}

// =============================================================================
// PUT /api/orders/{id}/status Handler
// =============================================================================

/// Replaces an order's status.
///
/// # Errors
///
/// - 400 when `id` is malformed or `status` is missing or unknown
/// - 404 when no such order exists
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiErrorResponse> {
    let order_id = OrderId::parse(&id)?;
    let Json(request) = body?;
    let status = request
        .status
        .as_deref()
        .filter(|status| !status.trim().is_empty())
        .ok_or(DomainError::MissingField("status"))?
        .trim()
        .parse::<OrderStatus>()?;

    let order = state
        .order_repository
        .find_by_id(&order_id)
        .await?
        .ok_or_else(|| ApiErrorResponse::not_found("Order not found"))?;

    if order.status.is_terminal() && order.status != status {
        tracing::warn!(
            %order_id,
            from = %order.status,
            to = %status,
            "Order leaving a terminal status"
        );
    }

    let order = order.with_status(status);
    state.order_repository.save(&order).await?;

    tracing::info!(%order_id, %status, admin = %caller.user_id, "Order status updated");
    Ok(Json(OrderResponse::from_order(&order, &ProductLookup::empty())))
}

// =============================================================================
// Helper Functions
// =============================================================================

fn customer_info_from_request(
    customer_info: Option<&CustomerInfoDto>,
) -> Result<CustomerInfo, DomainError> {
    let customer_info = customer_info.ok_or(DomainError::MissingField("customerInfo"))?;
    CustomerInfo::new(
        customer_info.name.trim(),
        customer_info.address.trim(),
        customer_info.phone.trim(),
    )
}

fn parse_quantity(quantity: i64) -> Result<u32, DomainError> {
    u32::try_from(quantity)
        .ok()
        .filter(|quantity| *quantity > 0)
        .ok_or_else(|| DomainError::invalid_field("quantity", "must be at least 1"))
}

/// Resolves the unit price of every item according to the pricing policy.
async fn price_line_items(
    state: &AppState,
    items: &[OrderItemRequest],
) -> Result<Vec<OrderLineItem>, ApiErrorResponse> {
    let product_ids = items
        .iter()
        .map(|item| ProductId::parse(item.product_id.id().trim()))
        .collect::<Result<Vec<_>, _>>()?;

    let catalog = match state.pricing_policy {
        PricingPolicy::ClientSupplied => None,
        PricingPolicy::Catalog => {
            Some(ProductLookup::load(state.product_repository.as_ref(), &product_ids).await?)
        }
    };

    items
        .iter()
        .zip(product_ids)
        .map(|(item, product_id)| {
            let price = unit_price(item, product_id, catalog.as_ref())?;
            OrderLineItem::new(product_id, parse_quantity(item.quantity)?, price)
        })
        .collect::<Result<Vec<_>, DomainError>>()
        .map_err(ApiErrorResponse::from)
}

fn unit_price(
    item: &OrderItemRequest,
    product_id: ProductId,
    catalog: Option<&ProductLookup>,
) -> Result<Decimal, DomainError> {
    match catalog {
        None => item
            .client_price()
            .ok_or(DomainError::MissingField("items.price")),
        Some(catalog) => catalog
            .get(&product_id)
            .map(|product| product.price)
            .ok_or_else(|| {
                DomainError::invalid_field("items.productId", format!("unknown product {product_id}"))
            }),
    }
}

async fn clear_cart(state: &AppState, order: &Order) -> Result<(), ApiErrorResponse> {
    let result = match state.cart_repository.find_by_user(&order.user_id).await {
        Ok(Some(cart)) => state.cart_repository.save(&cart.cleared()).await,
        Ok(None) => Ok(()),
        Err(error) => Err(error),
    };

    result.map_err(|error| {
        tracing::error!(
            order_id = %order.order_id,
            user_id = %order.user_id,
            %error,
            "Order placed but the cart could not be cleared"
        );
        ApiErrorResponse::internal_error(error.to_string())
    })
}

async fn populated(
    state: &AppState,
    orders: &[Order],
) -> Result<Vec<OrderResponse>, ApiErrorResponse> {
    let lookup =
        ProductLookup::load(state.product_repository.as_ref(), &referenced_products(orders))
            .await?;
    Ok(orders
        .iter()
        .map(|order| OrderResponse::from_order(order, &lookup))
        .collect())
}
