//! Member app
//!
//! Composition root for the member app: configuration loading, logging setup
//! and [`build_shell`], which wires local storage, the hosted auth and
//! database clients, the auth flows and the navigation shell together.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod logging;

use std::sync::Arc;

use app_core::{AuthService, ProfileCache};
use app_state::{SessionGate, SessionState};
use app_ui::AppShell;
use firebase_client::{
    AuthTokens, FirebaseAuth, FirebaseDatabase, RestClient, RestClientConfig, RestError,
};
use storage::{KvConfig, KvError, KvStore, SessionStore};
use thiserror::Error;

pub use config::{AppConfig, ConfigError};

/// Startup error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Local storage could not be opened
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// An HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] RestError),
}

/// Result type for startup operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Build the application shell from a validated configuration
pub fn build_shell(config: &AppConfig) -> Result<AppShell> {
    let kv = KvStore::new(KvConfig::new(&config.storage.path))?;
    build_shell_with_store(config, Arc::new(kv))
}

/// Build the application shell on top of an already opened store
pub fn build_shell_with_store(config: &AppConfig, kv: Arc<KvStore>) -> Result<AppShell> {
    let firebase = &config.firebase;
    let store = SessionStore::new(kv.clone());
    let tokens = AuthTokens::new();
    let client = |base_url: &str| {
        RestClient::new(RestClientConfig::new(base_url).with_timeout(firebase.request_timeout()))
    };

    let auth = FirebaseAuth::new(client(&firebase.auth_url)?, &firebase.api_key, tokens.clone())
        .with_persistence(kv, client(&firebase.token_url)?);
    let database = FirebaseDatabase::new(client(&firebase.database_url)?, tokens);

    let session = SessionState::new(store.clone());
    let profiles = ProfileCache::new(Arc::new(database), store.clone());
    let auth = AuthService::new(Arc::new(auth), profiles.clone(), session.clone())
        .with_phone_prefix(&config.sign_up.phone_prefix);

    tracing::debug!("application shell assembled");

    Ok(AppShell::new(auth, SessionGate::new(store), session, profiles)
        .with_carousel_interval(config.carousel.interval())
        .with_qr_payload(&config.qr.payload))
}
