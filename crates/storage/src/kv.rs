//! Key-value store for locally persisted values
//!
//! This module provides a small persisted key-value store on top of sled,
//! plus the [`LocalStorage`] trait the rest of the app talks to.

use async_trait::async_trait;
use sled::Db;
use std::sync::Arc;
use thiserror::Error;

/// Key-value store error types
#[derive(Debug, Error)]
pub enum KvError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored bytes are not valid UTF-8 text
    #[error("Value for key {0} is not valid text")]
    InvalidText(String),

    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Enable compression
    pub use_compression: bool,
    /// Flush interval in milliseconds (None for immediate flush)
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "member_app_kv.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            use_compression: true,
            flush_every_ms: Some(500),
        }
    }
}

impl KvConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// String-keyed persisted storage used by the app.
///
/// Read, write and delete are the only operations the app needs. Values are
/// plain text; structured values are encoded by the caller.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait LocalStorage: Send + Sync {
    /// Read the text stored under `key`
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting a missing key is not an error
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Key-value store implementation
#[derive(Clone)]
pub struct KvStore {
    db: Arc<Db>,
}

impl KvStore {
    /// Create a new key-value store with configuration
    pub fn new(config: KvConfig) -> Result<Self> {
        let mut db_config = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression);

        if let Some(ms) = config.flush_every_ms {
            db_config = db_config.flush_every_ms(Some(ms));
        }

        let db = db_config.open()?;
        tracing::debug!(path = %config.path, recovered = db.was_recovered(), "opened key-value store");

        Ok(Self { db: Arc::new(db) })
    }

    /// Create an in-memory key-value store (for testing)
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a raw text value by key
    pub fn get_text(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec()).map(Some).map_err(|_| {
                tracing::warn!(key, "stored value is not valid UTF-8");
                KvError::InvalidText(key.to_string())
            }),
            None => Ok(None),
        }
    }

    /// Set a raw text value by key
    pub fn set_text(&self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::InvalidKey(key.to_string()));
        }
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    /// Remove a value by key, returning whether it was present
    pub fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }

    async fn flush(&self) -> Result<()> {
        let bytes = self.db.flush_async().await?;
        tracing::trace!(bytes, "flushed key-value store");
        Ok(())
    }
}

/// Writes through the trait are flushed to disk before the call returns.
#[async_trait]
impl LocalStorage for KvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.get_text(key)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.set_text(key, value)?;
        self.flush().await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        if self.remove(key)? {
            self.flush().await?;
        }
        Ok(())
    }
}
