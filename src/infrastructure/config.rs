//! Application configuration loaded from the environment.
//!
//! Configuration is read once at startup; a `.env` file in the working
//! directory is honoured when present.
//!
//! - `HOST` (default `0.0.0.0`), `PORT` (default `5000`)
//! - `WORKER_THREADS`: tokio worker count (default: number of CPUs)
//! - `ORDER_PRICING`: `client` (default) | `catalog`
//! - `AUTH_TOKENS`: `token=user_id:role` entries separated by `,`
//!
//! Storage and media variables are documented on [`RepositoryConfig`] and
//! [`MediaConfig`].

use std::env;
use std::str::FromStr;

use crate::domain::PricingPolicy;

use super::{ConfigurationError, MediaConfig, RepositoryConfig};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Reads an environment variable, treating empty or whitespace-only values
/// as unset.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidValue` if the value is not valid
/// Unicode.
pub(crate) fn optional_env(key: &'static str) -> Result<Option<String>, ConfigurationError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigurationError::InvalidValue {
            key,
            message: "value is not valid Unicode".to_string(),
        }),
    }
}

/// Reads a required environment variable.
///
/// # Errors
///
/// Returns `ConfigurationError::MissingEnvVar` if the variable is unset or
/// empty.
pub(crate) fn required_env(key: &'static str) -> Result<String, ConfigurationError> {
    optional_env(key)?.ok_or(ConfigurationError::MissingEnvVar(key))
}

fn optional_env_parsed<T>(key: &'static str) -> Result<Option<T>, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|value| {
            value
                .parse()
                .map_err(|error: T::Err| ConfigurationError::InvalidValue {
                    key,
                    message: error.to_string(),
                })
        })
        .transpose()
}

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Explicit tokio worker count.
    pub worker_threads: Option<usize>,
    /// Storage backend selection.
    pub repository: RepositoryConfig,
    /// Media host selection.
    pub media: MediaConfig,
    /// Source of unit prices for new orders.
    pub pricing_policy: PricingPolicy,
    /// Raw static token table for the identity collaborator.
    pub auth_tokens: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            worker_threads: None,
            repository: RepositoryConfig::default(),
            media: MediaConfig::default(),
            pricing_policy: PricingPolicy::default(),
            auth_tokens: None,
        }
    }
}

impl AppConfig {
    /// Loads the configuration, reading `.env` first if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for malformed or missing values.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenvy::dotenv().ok();

        let worker_threads = optional_env_parsed::<usize>("WORKER_THREADS")?;
        if worker_threads == Some(0) {
            return Err(ConfigurationError::InvalidValue {
                key: "WORKER_THREADS",
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            host: optional_env("HOST")?.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: optional_env_parsed("PORT")?.unwrap_or(DEFAULT_PORT),
            worker_threads,
            repository: RepositoryConfig::from_env()?,
            media: MediaConfig::from_env()?,
            pricing_policy: optional_env_parsed("ORDER_PRICING")?.unwrap_or_default(),
            auth_tokens: optional_env("AUTH_TOKENS")?,
        })
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
