//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::domain::PricingPolicy;
use crate::infrastructure::{
    CartRepository, MediaUploader, OrderRepository, ProductRepository, Repositories,
};

use super::identity::Authenticator;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Catalog products.
    pub product_repository: Arc<dyn ProductRepository>,
    /// Per-user carts.
    pub cart_repository: Arc<dyn CartRepository>,
    /// Placed orders.
    pub order_repository: Arc<dyn OrderRepository>,
    /// Media host for product images.
    pub media_uploader: Arc<dyn MediaUploader>,
    /// Bearer token resolution.
    pub authenticator: Arc<dyn Authenticator>,
    /// Source of unit prices for new orders.
    pub pricing_policy: PricingPolicy,
}

impl AppState {
    /// Creates a new `AppState` from initialized repositories and
    /// collaborators, using client-supplied pricing.
    #[must_use]
    pub fn new(
        repositories: Repositories,
        media_uploader: Arc<dyn MediaUploader>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            product_repository: repositories.product_repository,
            cart_repository: repositories.cart_repository,
            order_repository: repositories.order_repository,
            media_uploader,
            authenticator,
            pricing_policy: PricingPolicy::default(),
        }
    }

    /// Replaces the pricing policy.
    #[must_use]
    pub fn with_pricing_policy(mut self, pricing_policy: PricingPolicy) -> Self {
        self.pricing_policy = pricing_policy;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("media_uploader", &self.media_uploader.provider_name())
            .field("pricing_policy", &self.pricing_policy)
            .finish_non_exhaustive()
    }
}
