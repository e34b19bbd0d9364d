//! Persisted session state and the launch gate
//!
//! The session is nothing more than the identifier saved after a successful
//! sign-in. Its presence at startup decides which screen the app opens on.

use firebase_client::{Uid, UidError};
use serde::{Deserialize, Serialize};
use storage::{KvError, SessionStore};

/// Session-related errors
#[derive(Debug, thiserror::Error)]
pub enum SessionStateError {
    /// Local storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// The stored identifier is not a valid user identifier
    #[error("Stored session identifier is invalid: {0}")]
    InvalidUid(#[from] UidError),
}

/// Result type for session state operations
pub type Result<T> = std::result::Result<T, SessionStateError>;

/// Where the app opens after the launch check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchDestination {
    /// First-time or logged-out user: onboarding splash
    Onboarding,
    /// Returning user: landing with the tab group
    Landing,
}

/// One-shot startup check over the persisted session identifier
#[derive(Clone)]
pub struct SessionGate {
    store: SessionStore,
}

impl SessionGate {
    /// Create a new session gate
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Decide the launch destination.
    ///
    /// A read failure is logged and treated like an absent identifier.
    pub async fn resolve(&self) -> LaunchDestination {
        match self.store.session_id().await {
            Ok(Some(_)) => LaunchDestination::Landing,
            Ok(None) => LaunchDestination::Onboarding,
            Err(e) => {
                tracing::error!("Failed to retrieve session identifier: {}", e);
                LaunchDestination::Onboarding
            }
        }
    }
}

/// Read/write access to the persisted session
#[derive(Clone)]
pub struct SessionState {
    store: SessionStore,
}

impl SessionState {
    /// Create a new session state
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Identifier of the signed-in user, if any
    pub async fn current_uid(&self) -> Result<Option<Uid>> {
        match self.store.session_id().await? {
            Some(raw) => Ok(Some(Uid::new(raw)?)),
            None => Ok(None),
        }
    }

    /// Persist the identifier of a freshly authenticated user
    pub async fn persist(&self, uid: &Uid) -> Result<()> {
        self.store.save_session_id(uid.as_str()).await?;
        tracing::info!(uid = %uid, "session persisted");
        Ok(())
    }

    /// Forget the session identifier.
    ///
    /// The cached profile is left in place; it is overwritten on the next fetch.
    pub async fn logout(&self) -> Result<()> {
        self.store.clear_session_id().await?;
        tracing::info!("session cleared");
        Ok(())
    }
}
