//! Configuration for the storage adapter.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Default Qdrant gRPC endpoint.
pub const DEFAULT_URL: &str = "http://localhost:6334";
/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "docs";
/// Default vector dimensionality (OpenAI `text-embedding-3-large`).
pub const DEFAULT_DIMENSIONS: usize = 3072;
/// Default connection and request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and collection parameters for a [`StorageAdapter`](crate::StorageAdapter).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Endpoint of the vector database.
    pub url: String,
    /// Name of the collection to store points in.
    pub collection: String,
    /// Vector dimensionality of the collection.
    pub dimensions: usize,
    /// Timeout applied to connecting and to each request.
    pub timeout_secs: u64,
    /// Optional API key for authenticated deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl StorageConfig {
    /// Create a new builder for constructing a [`StorageConfig`].
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::default()
    }

    /// Load configuration from `QDRANT_*` environment variables.
    ///
    /// Unset variables keep their defaults. Recognized variables are
    /// `QDRANT_URL`, `QDRANT_COLLECTION`, `QDRANT_DIMENSIONS`,
    /// `QDRANT_TIMEOUT_SECS` and `QDRANT_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigError`] if a numeric variable does not
    /// parse or the resulting configuration is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(url) = lookup("QDRANT_URL") {
            builder = builder.url(url);
        }
        if let Some(collection) = lookup("QDRANT_COLLECTION") {
            builder = builder.collection(collection);
        }
        if let Some(raw) = lookup("QDRANT_DIMENSIONS") {
            builder = builder.dimensions(parse_var("QDRANT_DIMENSIONS", &raw)?);
        }
        if let Some(raw) = lookup("QDRANT_TIMEOUT_SECS") {
            builder = builder.timeout_secs(parse_var("QDRANT_TIMEOUT_SECS", &raw)?);
        }
        if let Some(key) = lookup("QDRANT_API_KEY").filter(|k| !k.is_empty()) {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    /// The timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(StorageError::ConfigError("url must not be empty".to_string()));
        }
        if self.collection.trim().is_empty() {
            return Err(StorageError::ConfigError("collection must not be empty".to_string()));
        }
        if self.dimensions == 0 {
            return Err(StorageError::ConfigError(
                "dimensions must be greater than zero".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(StorageError::ConfigError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| StorageError::ConfigError(format!("invalid value for {name} ('{raw}'): {e}")))
}

/// Builder for constructing a validated [`StorageConfig`].
#[derive(Debug, Clone, Default)]
pub struct StorageConfigBuilder {
    config: StorageConfig,
}

impl StorageConfigBuilder {
    /// Set the vector database endpoint.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the vector dimensionality.
    pub fn dimensions(mut self, dims: usize) -> Self {
        self.config.dimensions = dims;
        self
    }

    /// Set the connection and request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Build the [`StorageConfig`], validating its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigError`] if:
    /// - `url` or `collection` is empty
    /// - `dimensions == 0`
    /// - `timeout_secs == 0`
    pub fn build(self) -> Result<StorageConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
