//! In-memory repository implementations.
//!
//! These back the service when no database is configured and are what the
//! endpoint tests run against.
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - `BTreeMap` keyed by object id, so listings follow creation order

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::domain::{Cart, Order, OrderId, Product, ProductId, UserId};
use crate::infrastructure::{
    CartRepository, OrderRepository, ProductRepository, RepositoryFuture,
};

// =============================================================================
// In-Memory Product Repository
// =============================================================================

/// In-memory implementation of `ProductRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<ProductId, Product>>>,
}

impl InMemoryProductRepository {
    /// Creates a new empty in-memory product repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn find_all(&self) -> RepositoryFuture<Vec<Product>> {
        let products = Arc::clone(&self.products);
        async move { Ok(products.read().await.values().cloned().collect()) }.boxed()
    }

    fn search_by_name(&self, query: &str) -> RepositoryFuture<Vec<Product>> {
        let products = Arc::clone(&self.products);
        let needle = query.to_lowercase();
        async move {
            let guard = products.read().await;
            Ok(guard
                .values()
                .filter(|product| product.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn find_by_id(&self, id: &ProductId) -> RepositoryFuture<Option<Product>> {
        let products = Arc::clone(&self.products);
        let id = *id;
        async move { Ok(products.read().await.get(&id).cloned()) }.boxed()
    }

    fn find_by_ids(&self, ids: &[ProductId]) -> RepositoryFuture<Vec<Product>> {
        let products = Arc::clone(&self.products);
        let ids = ids.to_vec();
        async move {
            let guard = products.read().await;
            Ok(guard
                .values()
                .filter(|product| ids.contains(&product.product_id))
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn save(&self, product: &Product) -> RepositoryFuture<()> {
        let products = Arc::clone(&self.products);
        let product = product.clone();
        async move {
            products.write().await.insert(product.product_id, product);
            Ok(())
        }
        .boxed()
    }

    fn delete(&self, id: &ProductId) -> RepositoryFuture<bool> {
        let products = Arc::clone(&self.products);
        let id = *id;
        async move { Ok(products.write().await.remove(&id).is_some()) }.boxed()
    }
}

// =============================================================================
// In-Memory Cart Repository
// =============================================================================

/// In-memory implementation of `CartRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<BTreeMap<UserId, Cart>>>,
}

impl InMemoryCartRepository {
    /// Creates a new empty in-memory cart repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartRepository for InMemoryCartRepository {
    fn find_by_user(&self, user_id: &UserId) -> RepositoryFuture<Option<Cart>> {
        let carts = Arc::clone(&self.carts);
        let user_id = user_id.clone();
        async move { Ok(carts.read().await.get(&user_id).cloned()) }.boxed()
    }

    fn save(&self, cart: &Cart) -> RepositoryFuture<()> {
        let carts = Arc::clone(&self.carts);
        let cart = cart.clone();
        async move {
            carts.write().await.insert(cart.user_id.clone(), cart);
            Ok(())
        }
        .boxed()
    }
}

// =============================================================================
// In-Memory Order Repository
// =============================================================================

/// In-memory implementation of `OrderRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<BTreeMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory order repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn find_all(&self) -> RepositoryFuture<Vec<Order>> {
        let orders = Arc::clone(&self.orders);
        async move { Ok(orders.read().await.values().cloned().collect()) }.boxed()
    }

    fn find_by_user(&self, user_id: &UserId) -> RepositoryFuture<Vec<Order>> {
        let orders = Arc::clone(&self.orders);
        let user_id = user_id.clone();
        async move {
            let guard = orders.read().await;
            Ok(guard
                .values()
                .filter(|order| order.user_id == user_id)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn find_by_id(&self, id: &OrderId) -> RepositoryFuture<Option<Order>> {
        let orders = Arc::clone(&self.orders);
        let id = *id;
        async move { Ok(orders.read().await.get(&id).cloned()) }.boxed()
    }

    fn save(&self, order: &Order) -> RepositoryFuture<()> {
        let orders = Arc::clone(&self.orders);
        let order = order.clone();
        async move {
            orders.write().await.insert(order.order_id, order);
            Ok(())
        }
        .boxed()
    }
}
