//! Repository traits for domain entities.
//!
//! Every method returns a boxed `Send` future so that handlers can hold the
//! repositories as `Arc<dyn …>` and swap backends at startup.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Cart, Order, OrderId, Product, ProductId, UserId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored document could not be mapped to or from the domain model.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result future returned by repository methods.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Product Repository
// =============================================================================

/// Repository trait for catalog products.
pub trait ProductRepository: Send + Sync {
    /// Lists every product, unfiltered and unpaginated.
    fn find_all(&self) -> RepositoryFuture<Vec<Product>>;

    /// Lists products whose name contains `query`, ignoring case.
    ///
    /// The query is matched literally; regular expression metacharacters
    /// carry no special meaning.
    fn search_by_name(&self, query: &str) -> RepositoryFuture<Vec<Product>>;

    /// Finds a product by its ID.
    ///
    /// Returns `Ok(None)` if the product does not exist.
    fn find_by_id(&self, id: &ProductId) -> RepositoryFuture<Option<Product>>;

    /// Finds every product whose ID is in `ids`. Unknown IDs are skipped.
    fn find_by_ids(&self, ids: &[ProductId]) -> RepositoryFuture<Vec<Product>>;

    /// Saves a product (insert or replace).
    fn save(&self, product: &Product) -> RepositoryFuture<()>;

    /// Deletes a product by its ID.
    ///
    /// Returns `Ok(true)` if the product was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: &ProductId) -> RepositoryFuture<bool>;
}

// =============================================================================
// Cart Repository
// =============================================================================

/// Repository trait for per-user carts.
pub trait CartRepository: Send + Sync {
    /// Finds the cart owned by `user_id`.
    fn find_by_user(&self, user_id: &UserId) -> RepositoryFuture<Option<Cart>>;

    /// Saves a cart, replacing any cart the same user already has.
    fn save(&self, cart: &Cart) -> RepositoryFuture<()>;
}

// =============================================================================
// Order Repository
// =============================================================================

/// Repository trait for placed orders.
///
/// List methods return orders in creation order.
pub trait OrderRepository: Send + Sync {
    /// Lists every order.
    fn find_all(&self) -> RepositoryFuture<Vec<Order>>;

    /// Lists the orders placed by `user_id`.
    fn find_by_user(&self, user_id: &UserId) -> RepositoryFuture<Vec<Order>>;

    /// Finds an order by its ID.
    fn find_by_id(&self, id: &OrderId) -> RepositoryFuture<Option<Order>>;

    /// Saves an order (insert or replace).
    fn save(&self, order: &Order) -> RepositoryFuture<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryError::NotFound("order".to_string()), "Entity not found: order")]
    #[case(RepositoryError::DatabaseError("timeout".to_string()), "Database error: timeout")]
    #[case(
        RepositoryError::SerializationError("bad stock".to_string()),
        "Serialization error: bad stock"
    )]
    fn repository_error_display(#[case] error: RepositoryError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
