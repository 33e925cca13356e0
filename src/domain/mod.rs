//! Domain module for the storefront.
//!
//! This module contains the catalog, cart and order models together with
//! the identifier value objects they share.

pub mod cart;
pub mod error;
pub mod identifier;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem};
pub use error::DomainError;
pub use identifier::{OrderId, ProductId, Timestamp, UserId, parse_object_id};
pub use order::{
    CustomerInfo, Order, OrderLineItem, OrderStatus, PricingPolicy, compute_total,
};
pub use product::{Product, ProductPatch};
