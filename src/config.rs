//! Application configuration
//!
//! Loading order:
//! 1. The JSON file at the given path, if it exists, else defaults
//! 2. `MEMBER_APP_*` environment variable overrides
//!
//! Call [`AppConfig::validate`] after loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default auth service endpoint
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";

/// Default token refresh endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com";

/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default local storage path
pub const DEFAULT_STORAGE_PATH: &str = "member_app_kv.db";

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("IO error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`AppConfig`]
    #[error("JSON parse error in {path}: {source}")]
    Json {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Hosted backend endpoints and credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    /// Web API key sent with auth requests
    pub api_key: String,
    /// Auth service base URL
    pub auth_url: String,
    /// Token refresh service base URL
    pub token_url: String,
    /// Realtime database base URL
    pub database_url: String,
    /// Timeout applied to every request
    pub request_timeout_secs: u64,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            database_url: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl FirebaseConfig {
    /// Request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Local storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the key-value store
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_STORAGE_PATH.to_string(),
        }
    }
}

/// Sign-up settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignUpConfig {
    /// Country prefix added to phone numbers
    pub phone_prefix: String,
}

impl Default for SignUpConfig {
    fn default() -> Self {
        Self {
            phone_prefix: app_core::DEFAULT_PHONE_PREFIX.to_string(),
        }
    }
}

/// News carousel settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Milliseconds between advances
    pub interval_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: app_state::DEFAULT_TICK_INTERVAL.as_millis() as u64,
        }
    }
}

impl CarouselConfig {
    /// Advance period
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// QR code settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    /// Encoded text
    pub payload: String,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            payload: app_ui::screens::DEFAULT_QR_PAYLOAD.to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Hosted backend
    pub firebase: FirebaseConfig,
    /// Local storage
    pub storage: StorageConfig,
    /// Sign-up form
    pub sign_up: SignUpConfig,
    /// News carousel
    pub carousel: CarouselConfig,
    /// QR code tab
    pub qr: QrConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the file at `path` (or defaults) and apply environment overrides.
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            Self::load_json(path)?
        } else {
            AppConfig::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_json(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply `MEMBER_APP_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, target: &mut String| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };
        string("MEMBER_APP_API_KEY", &mut self.firebase.api_key);
        string("MEMBER_APP_AUTH_URL", &mut self.firebase.auth_url);
        string("MEMBER_APP_TOKEN_URL", &mut self.firebase.token_url);
        string("MEMBER_APP_DATABASE_URL", &mut self.firebase.database_url);
        string("MEMBER_APP_STORAGE_PATH", &mut self.storage.path);
        string("MEMBER_APP_PHONE_PREFIX", &mut self.sign_up.phone_prefix);
        string("MEMBER_APP_QR_PAYLOAD", &mut self.qr.payload);
        string("MEMBER_APP_LOG_FILTER", &mut self.logging.filter);

        Self::apply_parse(
            &lookup,
            "MEMBER_APP_CAROUSEL_INTERVAL_MS",
            &mut self.carousel.interval_ms,
        );
        Self::apply_parse(
            &lookup,
            "MEMBER_APP_REQUEST_TIMEOUT_SECS",
            &mut self.firebase.request_timeout_secs,
        );
    }

    fn apply_parse<F, T>(lookup: &F, key: &str, target: &mut T)
    where
        F: Fn(&str) -> Option<String>,
        T: FromStr,
    {
        if let Some(raw) = lookup(key) {
            match raw.parse() {
                Ok(value) => *target = value,
                Err(_) => tracing::warn!("Ignoring unparsable {}={:?}", key, raw),
            }
        }
    }

    /// Reject configurations the app cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.firebase.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("firebase.api_key must be set".to_string()));
        }
        if self.firebase.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "firebase.database_url must be set".to_string(),
            ));
        }
        if self.firebase.auth_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "firebase.auth_url must be set".to_string(),
            ));
        }
        if self.firebase.token_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "firebase.token_url must be set".to_string(),
            ));
        }
        if self.firebase.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "firebase.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "carousel.interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Log configuration summary (never logs the API key).
    pub fn log_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  firebase: auth={} token={} database={} timeout={}s api_key={}",
            self.firebase.auth_url,
            self.firebase.token_url,
            self.firebase.database_url,
            self.firebase.request_timeout_secs,
            if self.firebase.api_key.is_empty() { "unset" } else { "set" }
        );
        tracing::info!("  storage: {}", self.storage.path);
        tracing::info!("  sign_up: phone_prefix={}", self.sign_up.phone_prefix);
        tracing::info!("  carousel: interval={}ms", self.carousel.interval_ms);
        tracing::info!("  logging: {}", self.logging.filter);
    }
}
