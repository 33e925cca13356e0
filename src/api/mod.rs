//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod cart;
pub mod dto;
pub mod error;
pub mod identity;
pub mod order;
pub mod populate;
pub mod product;
pub mod routes;
pub mod state;

pub use cart::{add_to_cart, get_cart, remove_from_cart};
pub use dto::{
    AddToCartRequest, CartItemResponse, CartResponse, CreateOrderRequest, CustomerInfoDto,
    MessageResponse, OrderItemProduct, OrderItemRequest, OrderItemResponse, OrderResponse,
    ProductReference, ProductResponse, SearchQuery, UpdateStatusRequest,
};
pub use error::{ApiError, ApiErrorResponse, FieldError};
pub use identity::{AdminCaller, Authenticator, Caller, Role, StaticTokenAuthenticator};
pub use order::{create_order, list_orders, my_orders, update_order_status};
pub use populate::ProductLookup;
pub use product::{
    create_product, delete_product, get_product, list_products, search_products, update_product,
};
pub use routes::{HealthResponse, create_router, health_check};
pub use state::AppState;
