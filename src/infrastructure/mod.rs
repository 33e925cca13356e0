//! Infrastructure module for external services.
//!
//! This module contains the repositories, the media upload adapter and the
//! configuration that selects between their implementations.

pub mod config;
pub mod factory;
pub mod in_memory;
pub mod media;
pub mod mongo;
pub mod repository;

pub use config::AppConfig;
pub use factory::{
    ConfigurationError, FactoryError, Repositories, RepositoryConfig, RepositoryConfigBuilder,
    RepositoryFactory, StorageMode,
};
pub use in_memory::{InMemoryCartRepository, InMemoryOrderRepository, InMemoryProductRepository};
pub use media::{
    CloudinaryConfig, CloudinaryUploader, InMemoryUploader, MediaConfig, MediaMode, MediaUploader,
    PRODUCT_IMAGE_FOLDER, UploadError,
};
pub use mongo::{MongoCartRepository, MongoOrderRepository, MongoProductRepository};
pub use repository::{
    CartRepository, OrderRepository, ProductRepository, RepositoryError, RepositoryFuture,
};
