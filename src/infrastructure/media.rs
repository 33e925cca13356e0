//! Media upload adapter.
//!
//! Product images are handed to a remote media host and only the returned
//! public URL is stored with the product. No size or type validation is
//! performed here.
//!
//! # Environment Variables
//!
//! - `MEDIA_MODE`: `in_memory` (default) | `cloudinary`
//! - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`
//!   (required when `MEDIA_MODE=cloudinary`)

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;

use super::ConfigurationError;
use super::config::{optional_env, required_env};

/// Folder that product images are uploaded to.
pub const PRODUCT_IMAGE_FOLDER: &str = "ecommerce_products";

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

// =============================================================================
// Upload Error
// =============================================================================

/// Errors returned by a media upload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    /// The media host rejected the upload.
    #[error("{0}")]
    Provider(String),

    /// The media host could not be reached or answered with garbage.
    #[error("Upload transport error: {0}")]
    Transport(String),

    /// The uploader is not configured correctly.
    #[error("Upload configuration error: {0}")]
    Configuration(String),
}

// =============================================================================
// Media Uploader Trait
// =============================================================================

/// Uploads a byte buffer under a logical folder and yields its public URL.
pub trait MediaUploader: Send + Sync {
    /// Uploads `content` into `folder`.
    fn upload(&self, content: Bytes, folder: &str) -> BoxFuture<'static, Result<String, UploadError>>;

    /// Returns the provider name for logging.
    fn provider_name(&self) -> &'static str;
}

// =============================================================================
// Cloudinary
// =============================================================================

/// Credentials for the Cloudinary upload API.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    /// Account cloud name.
    pub cloud_name: String,
    /// Public API key.
    pub api_key: String,
    /// API secret used to sign uploads.
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl CloudinaryConfig {
    /// Reads the three `CLOUDINARY_*` variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingEnvVar` for the first one missing.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Ok(Self {
            cloud_name: required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: required_env("CLOUDINARY_API_KEY")?,
            api_secret: required_env("CLOUDINARY_API_SECRET")?,
        })
    }
}

/// Signs upload parameters: SHA-256 hex of `folder=…&timestamp=…` followed
/// by the API secret.
#[must_use]
pub fn sign_upload(folder: &str, timestamp: i64, api_secret: &str) -> String {
    let payload = format!("folder={folder}&timestamp={timestamp}{api_secret}");
    format!("{:x}", Sha256::digest(payload.as_bytes()))
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    error: Option<CloudinaryErrorBody>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

/// Signed uploads to Cloudinary over HTTPS.
#[derive(Debug, Clone)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryUploader {
    /// Creates an uploader with its own HTTP client.
    #[must_use]
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{CLOUDINARY_API_BASE}/{}/image/upload",
            self.config.cloud_name
        )
    }
}

impl MediaUploader for CloudinaryUploader {
    fn upload(&self, content: Bytes, folder: &str) -> BoxFuture<'static, Result<String, UploadError>> {
        let client = self.client.clone();
        let url = self.upload_url();
        let config = self.config.clone();
        let folder = folder.to_string();

        async move { execute_cloudinary_upload(&client, &url, &config, content, &folder).await }
            .boxed()
    }

    fn provider_name(&self) -> &'static str {
        "cloudinary"
    }
}

async fn execute_cloudinary_upload(
    client: &reqwest::Client,
    url: &str,
    config: &CloudinaryConfig,
    content: Bytes,
    folder: &str,
) -> Result<String, UploadError> {
    let timestamp = chrono::Utc::now().timestamp();
    let signature = sign_upload(folder, timestamp, &config.api_secret);

    let file = reqwest::multipart::Part::bytes(content.to_vec()).file_name("upload");
    let form = reqwest::multipart::Form::new()
        .part("file", file)
        .text("api_key", config.api_key.clone())
        .text("timestamp", timestamp.to_string())
        .text("folder", folder.to_string())
        .text("signature", signature)
        .text("signature_algorithm", "sha256");

    let response = client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|error| UploadError::Transport(error.to_string()))?;
    let status = response.status();
    let body: CloudinaryUploadResponse = response
        .json()
        .await
        .map_err(|error| UploadError::Transport(format!("HTTP {status}: {error}")))?;

    if let Some(error) = body.error {
        tracing::error!(status = %status, message = %error.message, "Cloudinary rejected upload");
        return Err(UploadError::Provider(error.message));
    }

    match body.secure_url {
        Some(secure_url) if status.is_success() => {
            tracing::info!(
                public_id = body.public_id.as_deref().unwrap_or_default(),
                url = %secure_url,
                "Upload succeeded"
            );
            Ok(secure_url)
        }
        _ => Err(UploadError::Provider(format!(
            "Upload failed with HTTP {status}"
        ))),
    }
}

// =============================================================================
// In-Memory
// =============================================================================

/// Keeps uploads in process memory and hands out `memory://` URLs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUploader {
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl InMemoryUploader {
    /// Creates an empty uploader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes stored under `url`, if any.
    pub async fn stored(&self, url: &str) -> Option<Bytes> {
        self.objects.read().await.get(url).cloned()
    }
}

impl MediaUploader for InMemoryUploader {
    fn upload(&self, content: Bytes, folder: &str) -> BoxFuture<'static, Result<String, UploadError>> {
        let objects = Arc::clone(&self.objects);
        let url = format!("memory://{folder}/{}", ObjectId::new().to_hex());

        async move {
            objects.write().await.insert(url.clone(), content);
            Ok(url)
        }
        .boxed()
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Which media host to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaMode {
    /// Keep uploads in memory.
    #[default]
    InMemory,
    /// Upload to Cloudinary.
    Cloudinary,
}

impl FromStr for MediaMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "cloudinary" => Ok(Self::Cloudinary),
            _ => Err(ConfigurationError::InvalidMediaMode(value.to_string())),
        }
    }
}

/// Media host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaConfig {
    /// Selected host.
    pub mode: MediaMode,
    /// Cloudinary credentials, present when `mode` is `Cloudinary`.
    pub cloudinary: Option<CloudinaryConfig>,
}

impl MediaConfig {
    /// Reads `MEDIA_MODE` and, for Cloudinary, its credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for an unknown mode or missing
    /// credentials.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let mode = optional_env("MEDIA_MODE")?
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();
        let cloudinary = match mode {
            MediaMode::InMemory => None,
            MediaMode::Cloudinary => Some(CloudinaryConfig::from_env()?),
        };
        Ok(Self { mode, cloudinary })
    }

    /// Builds the configured uploader.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Configuration` when Cloudinary is selected
    /// without credentials.
    pub fn create_uploader(&self) -> Result<Arc<dyn MediaUploader>, UploadError> {
        match (self.mode, &self.cloudinary) {
            (MediaMode::InMemory, _) => Ok(Arc::new(InMemoryUploader::new())),
            (MediaMode::Cloudinary, Some(config)) => {
                Ok(Arc::new(CloudinaryUploader::new(config.clone())))
            }
            (MediaMode::Cloudinary, None) => Err(UploadError::Configuration(
                "Cloudinary credentials are not set".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn sign_upload_hashes_sorted_parameters_with_secret() {
        assert_eq!(
            sign_upload("ecommerce_products", 1_315_060_510, "abcd"),
            "1e6390e5a060cabdb16e10b624e9be79774ecc6b2162397b2fbb9ac2423a3144"
        );
    }

    #[rstest]
    fn cloudinary_upload_url_uses_cloud_name() {
        let uploader = CloudinaryUploader::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        });
        assert_eq!(
            uploader.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }

    #[rstest]
    fn cloudinary_config_debug_hides_secret() {
        let config = CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "very-secret".to_string(),
        };
        assert!(!format!("{config:?}").contains("very-secret"));
    }

    #[rstest]
    #[case("in_memory", MediaMode::InMemory)]
    #[case("CLOUDINARY", MediaMode::Cloudinary)]
    fn media_mode_from_str(#[case] input: &str, #[case] expected: MediaMode) {
        assert_eq!(input.parse::<MediaMode>().unwrap(), expected);
    }

    #[rstest]
    fn media_mode_rejects_unknown() {
        assert_eq!(
            "s3".parse::<MediaMode>(),
            Err(ConfigurationError::InvalidMediaMode("s3".to_string()))
        );
    }

    #[rstest]
    fn cloudinary_without_credentials_cannot_build_uploader() {
        let config = MediaConfig {
            mode: MediaMode::Cloudinary,
            cloudinary: None,
        };
        assert!(matches!(
            config.create_uploader(),
            Err(UploadError::Configuration(_))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn in_memory_upload_stores_bytes_under_folder() {
        let uploader = InMemoryUploader::new();
        let url = uploader
            .upload(Bytes::from_static(b"png"), PRODUCT_IMAGE_FOLDER)
            .await
            .unwrap();

        assert!(url.starts_with("memory://ecommerce_products/"));
        assert_eq!(uploader.stored(&url).await, Some(Bytes::from_static(b"png")));
        assert_eq!(uploader.provider_name(), "in_memory");
    }
}
