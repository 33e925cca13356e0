//! Data Transfer Objects for API requests and responses.
//!
//! Response shapes follow the stored documents: identifiers are rendered as
//! `_id`, the remaining fields are camelCase, and prices are JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Cart, CartItem, Order, OrderLineItem, OrderStatus, Product, ProductId};

use super::populate::ProductLookup;

// =============================================================================
// Product DTOs
// =============================================================================

/// Response DTO for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    /// Product ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Public image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Units in stock.
    pub stock: u32,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.product_id.to_string(),
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            image: product.image.clone(),
            stock: product.stock,
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}

/// Query string of `GET /api/products/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for in product names.
    #[serde(default)]
    pub q: Option<String>,
}

/// Body returned after a product is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A product reference that is either resolved to the product or left as
/// its id (when the product no longer exists or was not looked up).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductReference {
    /// The referenced product, inlined.
    Resolved(ProductResponse),
    /// The bare product id.
    Unresolved(String),
}

impl ProductReference {
    /// The referenced product id, whether or not it was resolved.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Resolved(product) => &product.id,
            Self::Unresolved(id) => id,
        }
    }
}

// =============================================================================
// Cart DTOs
// =============================================================================

/// Request DTO for `POST /api/cart`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    /// Product to add.
    #[serde(default)]
    pub product_id: Option<String>,
    /// Units to add; must be at least 1.
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Response DTO for one cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    /// Referenced product.
    pub product_id: ProductReference,
    /// Units in the cart.
    pub quantity: u32,
}

/// Response DTO for a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    /// Owner of the cart.
    pub user_id: String,
    /// Cart lines.
    pub items: Vec<CartItemResponse>,
}

impl CartResponse {
    /// Builds the response, inlining every product found in `lookup`.
    #[must_use]
    pub fn from_cart(cart: &Cart, lookup: &ProductLookup) -> Self {
        Self {
            user_id: cart.user_id.to_string(),
            items: cart
                .items
                .iter()
                .map(|item: &CartItem| CartItemResponse {
                    product_id: lookup.reference(&item.product_id),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Order DTOs
// =============================================================================

/// Customer contact as sent and returned over the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfoDto {
    /// Recipient name.
    #[serde(default)]
    pub name: String,
    /// Delivery address.
    #[serde(default)]
    pub address: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
}

/// The `productId` of an order item: either a bare id or a product object
/// as returned by the cart endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderItemProduct {
    /// Product id string.
    Id(String),
    /// Populated product; only `_id` and `price` are read.
    Populated {
        /// Product id.
        #[serde(rename = "_id")]
        id: String,
        /// Unit price shown to the client.
        #[serde(default, with = "rust_decimal::serde::float_option")]
        price: Option<Decimal>,
    },
}

impl OrderItemProduct {
    /// The product id string.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Populated { id, .. } => id,
        }
    }

    /// The embedded price, if the product was populated with one.
    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        match self {
            Self::Id(_) => None,
            Self::Populated { price, .. } => *price,
        }
    }
}

/// One item of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    /// Ordered product.
    pub product_id: OrderItemProduct,
    /// Units ordered.
    pub quantity: i64,
    /// Unit price; takes precedence over a populated product's price.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

impl OrderItemRequest {
    /// Client-supplied unit price for this item.
    #[must_use]
    pub fn client_price(&self) -> Option<Decimal> {
        self.price.or_else(|| self.product_id.price())
    }
}

/// Request DTO for `POST /api/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Delivery contact.
    #[serde(default)]
    pub customer_info: Option<CustomerInfoDto>,
    /// Items to order. Absent and `null` both mean no items.
    #[serde(default)]
    pub items: Option<Vec<OrderItemRequest>>,
}

impl CreateOrderRequest {
    /// Requested items, empty when none were sent.
    #[must_use]
    pub fn items(&self) -> &[OrderItemRequest] {
        self.items.as_deref().unwrap_or_default()
    }
}

/// Request DTO for `PUT /api/orders/{id}/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatusRequest {
    /// New status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Response DTO for one order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    /// Ordered product.
    pub product_id: ProductReference,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price at the time of the order.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Response DTO for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Order ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// User who placed the order.
    pub user_id: String,
    /// Ordered lines.
    pub items: Vec<OrderItemResponse>,
    /// Order total.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Delivery contact.
    pub customer_info: CustomerInfoDto,
    /// Current status.
    pub status: OrderStatus,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

impl OrderResponse {
    /// Builds the response, inlining every product found in `lookup`.
    #[must_use]
    pub fn from_order(order: &Order, lookup: &ProductLookup) -> Self {
        Self {
            id: order.order_id.to_string(),
            user_id: order.user_id.to_string(),
            items: order
                .items
                .iter()
                .map(|item: &OrderLineItem| OrderItemResponse {
                    product_id: lookup.reference(&item.product_id),
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            total: order.total,
            customer_info: CustomerInfoDto {
                name: order.customer_info.name.clone(),
                address: order.customer_info.address.clone(),
                phone: order.customer_info.phone.clone(),
            },
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

/// Product ids referenced by a set of orders, deduplicated.
#[must_use]
pub fn referenced_products(orders: &[Order]) -> Vec<ProductId> {
    let mut ids: Vec<ProductId> = orders.iter().flat_map(Order::product_ids).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
