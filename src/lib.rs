//! # storefront-api
//!
//! Backend for a small online store: a product catalog, per-user shopping
//! carts and order placement, stored in MongoDB, with product images pushed
//! to an external media host.
//!
//! ## Layout
//!
//! - [`domain`]: catalog, cart and order models and their invariants
//! - [`infrastructure`]: repositories, media upload and configuration
//! - [`api`]: axum handlers, DTOs, caller identity and the route table

pub mod api;
pub mod domain;
pub mod infrastructure;
