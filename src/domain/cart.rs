//! Shopping cart model.
//!
//! A cart belongs to exactly one user and is created lazily the first time
//! that user touches it. Carts are never deleted, only emptied in place.

use super::{DomainError, ProductId, UserId};

/// One product line in a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    /// Referenced catalog product.
    pub product_id: ProductId,
    /// Number of units, always at least one.
    pub quantity: u32,
}

impl CartItem {
    /// Creates a cart line.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` when `quantity` is zero.
    pub fn new(product_id: ProductId, quantity: u32) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_field("quantity", "must be at least 1"));
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

/// A user's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    /// Owner of the cart; doubles as its identity.
    pub user_id: UserId,
    /// Cart lines, at most one per product.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart for `user_id`.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    /// Adds `item` to the cart.
    ///
    /// If the product is already present its quantity is increased by
    /// `item.quantity`; otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidField` when the merged quantity does not
    /// fit in a `u32`.
    pub fn add_item(mut self, item: CartItem) -> Result<Self, DomainError> {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or_else(|| DomainError::invalid_field("quantity", "is too large"))?;
            }
            None => self.items.push(item),
        }
        Ok(self)
    }

    /// Removes every line referencing `product_id`. Removing an absent
    /// product leaves the cart unchanged.
    #[must_use]
    pub fn remove_product(mut self, product_id: &ProductId) -> Self {
        self.items.retain(|item| item.product_id != *product_id);
        self
    }

    /// Empties the cart.
    #[must_use]
    pub fn cleared(self) -> Self {
        Self::empty(self.user_id)
    }

    /// Returns true when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity held for `product_id`, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.product_id == *product_id)
            .map(|item| item.quantity)
    }

    /// Product ids referenced by the cart, in line order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.product_id).collect()
    }
}
