//! Inline resolution of product references.
//!
//! Cart and order listings return each referenced product in place of its
//! id. Products are fetched in one bulk query per response.

use std::collections::HashMap;

use crate::domain::{Product, ProductId};
use crate::infrastructure::{ProductRepository, RepositoryError};

use super::dto::{ProductReference, ProductResponse};

/// Products fetched for one response, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ProductLookup {
    products: HashMap<ProductId, Product>,
}

impl ProductLookup {
    /// A lookup that resolves nothing; every reference stays a bare id.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetches every product in `ids` that still exists.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn load(
        repository: &dyn ProductRepository,
        ids: &[ProductId],
    ) -> Result<Self, RepositoryError> {
        if ids.is_empty() {
            return Ok(Self::empty());
        }
        let products = repository.find_by_ids(ids).await?;
        Ok(Self::from_products(products))
    }

    /// Builds a lookup from already fetched products.
    #[must_use]
    pub fn from_products(products: Vec<Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|product| (product.product_id, product))
                .collect(),
        }
    }

    /// Returns the found product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// The wire reference for `id`.
    #[must_use]
    pub fn reference(&self, id: &ProductId) -> ProductReference {
        self.get(id).map_or_else(
            || ProductReference::Unresolved(id.to_string()),
            |product| ProductReference::Resolved(ProductResponse::from(product)),
        )
    }
}
