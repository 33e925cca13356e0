//! Route table.

use axum::{
    Json, Router,
    routing::{delete, get, put},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::cart::{add_to_cart, get_cart, remove_from_cart};
use super::order::{create_order, list_orders, my_orders, update_order_status};
use super::product::{
    create_product, delete_product, get_product, list_products, search_products, update_product,
};
use super::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Builds the application router with tracing and permissive CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Catalog
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/search", get(search_products))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Cart
        .route("/api/cart", get(get_cart).post(add_to_cart))
        .route("/api/cart/{product_id}", delete(remove_from_cart))
        // Orders
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/my-orders", get(my_orders))
        .route("/api/orders/{id}/status", put(update_order_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
