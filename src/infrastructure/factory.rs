//! Repository factory for runtime backend selection.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `mongodb`
//! - `MONGODB_URI`: connection string (required when `STORAGE_MODE=mongodb`)
//! - `MONGODB_DATABASE`: database name (default: `ecommerce`)
//!
//! # Example
//!
//! ```ignore
//! let config = RepositoryConfig::from_env()?;
//! let repositories = RepositoryFactory::new(config).create().await?;
//! let products = repositories.product_repository.find_all().await?;
//! ```

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::config::optional_env;
use super::{
    CartRepository, InMemoryCartRepository, InMemoryOrderRepository, InMemoryProductRepository,
    MongoCartRepository, MongoOrderRepository, MongoProductRepository, OrderRepository,
    ProductRepository, mongo,
};

/// Database used when `MONGODB_DATABASE` is not set.
pub const DEFAULT_DATABASE_NAME: &str = "ecommerce";

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage mode for persistent data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local maps. Suitable for testing and development.
    #[default]
    InMemory,
    /// `MongoDB` document store.
    MongoDb,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Storage backend.
    pub storage_mode: StorageMode,
    /// `MongoDB` connection string (required when `storage_mode` is `MongoDb`).
    pub mongodb_uri: Option<String>,
    /// `MongoDB` database name.
    pub database_name: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            mongodb_uri: None,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
        }
    }
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `STORAGE_MODE` is invalid or
    /// `MONGODB_URI` is missing when `STORAGE_MODE=mongodb`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let storage_mode = optional_env("STORAGE_MODE")?
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            storage_mode,
            mongodb_uri: optional_env("MONGODB_URI")?,
            database_name: optional_env("MONGODB_DATABASE")?
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingMongoDbUri` when the `MongoDB`
    /// backend is selected without a connection string.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::MongoDb && self.mongodb_uri.is_none() {
            return Err(ConfigurationError::MissingMongoDbUri);
        }
        Ok(())
    }
}

/// Builder for `RepositoryConfig`.
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::MongoDb)
///     .mongodb_uri("mongodb://localhost:27017")
///     .database_name("shop")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    mongodb_uri: Option<String>,
    database_name: Option<String>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `MongoDB` connection string.
    #[must_use]
    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    /// Sets the `MongoDB` database name.
    #[must_use]
    pub fn database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            mongodb_uri: self.mongodb_uri,
            database_name: self
                .database_name
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'mongodb'")]
    InvalidStorageMode(String),

    /// Invalid media mode value.
    #[error("Invalid media mode: '{0}'. Expected 'in_memory' or 'cloudinary'")]
    InvalidMediaMode(String),

    /// Missing `MONGODB_URI` when storage mode is `MongoDB`.
    #[error("MONGODB_URI environment variable is required when STORAGE_MODE=mongodb")]
    MissingMongoDbUri,

    /// A required environment variable is not set.
    #[error("{0} environment variable is required")]
    MissingEnvVar(&'static str),

    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The name of the environment variable.
        key: &'static str,
        /// Why the value is invalid.
        message: String,
    },
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Collection of initialized repositories, shared across request handlers.
#[derive(Clone)]
pub struct Repositories {
    /// Catalog products.
    pub product_repository: Arc<dyn ProductRepository>,
    /// Per-user carts.
    pub cart_repository: Arc<dyn CartRepository>,
    /// Placed orders.
    pub order_repository: Arc<dyn OrderRepository>,
}

impl Repositories {
    /// Fresh in-memory repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            product_repository: Arc::new(InMemoryProductRepository::new()),
            cart_repository: Arc::new(InMemoryCartRepository::new()),
            order_repository: Arc::new(InMemoryOrderRepository::new()),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("product_repository", &"Arc<dyn ProductRepository>")
            .field("cart_repository", &"Arc<dyn CartRepository>")
            .field("order_repository", &"Arc<dyn OrderRepository>")
            .finish()
    }
}

/// Factory for creating repository instances based on configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates all repositories based on the configuration.
    ///
    /// For `MongoDb` a single client is created and shared by the three
    /// repositories.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the configuration is incomplete or the
    /// database client cannot be created.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Repositories::in_memory()),
            StorageMode::MongoDb => {
                let uri = self
                    .config
                    .mongodb_uri
                    .as_deref()
                    .ok_or(ConfigurationError::MissingMongoDbUri)?;
                let database = mongo::connect(uri, &self.config.database_name)
                    .await
                    .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

                Ok(Repositories {
                    product_repository: Arc::new(MongoProductRepository::new(&database)),
                    cart_repository: Arc::new(MongoCartRepository::new(&database)),
                    order_repository: Arc::new(MongoOrderRepository::new(&database)),
                })
            }
        }
    }
}
