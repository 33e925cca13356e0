//! Catalog product model.

use rust_decimal::Decimal;

use super::{DomainError, ProductId};

/// A catalog product.
///
/// Invariants: `name` is non-empty and `price` is non-negative. `stock`
/// is an unsigned count so it can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Unique identifier.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Free-form description.
    pub description: Option<String>,
    /// Public URL of the product image.
    pub image: Option<String>,
    /// Units in stock.
    pub stock: u32,
}

impl Product {
    /// Creates a product, checking the catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` if the name is blank and
    /// `DomainError::InvalidField` if the price is negative.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        stock: u32,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::MissingField("name"));
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(DomainError::invalid_field("price", "must not be negative"));
        }

        Ok(Self {
            product_id,
            name,
            price,
            description: None,
            image: None,
            stock,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(self, description: Option<String>) -> Self {
        Self {
            description,
            ..self
        }
    }

    /// Sets the image URL.
    #[must_use]
    pub fn with_image(self, image: Option<String>) -> Self {
        Self { image, ..self }
    }

    /// Applies a partial update. Fields absent from the patch keep their
    /// current value.
    ///
    /// After merging, name must be non-empty and both price and stock must
    /// be non-zero, otherwise the update is rejected.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` naming the first field that
    /// fails the post-merge check.
    pub fn apply(self, patch: ProductPatch) -> Result<Self, DomainError> {
        let merged = Self {
            product_id: self.product_id,
            name: patch.name.unwrap_or(self.name),
            price: patch.price.unwrap_or(self.price),
            description: patch.description.or(self.description),
            image: patch.image.or(self.image),
            stock: patch.stock.unwrap_or(self.stock),
        };

        if merged.name.trim().is_empty() {
            return Err(DomainError::MissingField("name"));
        }
        if merged.price.is_zero() {
            return Err(DomainError::MissingField("price"));
        }
        if merged.stock == 0 {
            return Err(DomainError::MissingField("stock"));
        }
        if merged.price.is_sign_negative() {
            return Err(DomainError::invalid_field("price", "must not be negative"));
        }

        Ok(merged)
    }
}

/// Fields supplied by a partial product update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement price.
    pub price: Option<Decimal>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement image URL.
    pub image: Option<String>,
    /// Replacement stock count.
    pub stock: Option<u32>,
}

impl ProductPatch {
    /// Returns true when the patch carries no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.stock.is_none()
    }
}
