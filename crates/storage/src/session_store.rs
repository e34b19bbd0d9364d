//! Persisted session keys
//!
//! Two well-known keys live in local storage: the session identifier issued by
//! the auth service, and the last fetched user profile encoded as JSON text.

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::kv::{LocalStorage, Result};

/// Key holding the raw session identifier
pub const USER_UID_KEY: &str = "userUID";

/// Key holding the cached user profile as JSON text
pub const USER_DATA_KEY: &str = "userData";

/// Typed access to the session keys in local storage
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
}

impl SessionStore {
    /// Create a new session store
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// Read the persisted session identifier
    ///
    /// An empty stored value counts as absent.
    pub async fn session_id(&self) -> Result<Option<String>> {
        let uid = self.storage.get_item(USER_UID_KEY).await?;
        Ok(uid.filter(|uid| !uid.is_empty()))
    }

    /// Persist the session identifier
    pub async fn save_session_id(&self, uid: &str) -> Result<()> {
        self.storage.set_item(USER_UID_KEY, uid).await
    }

    /// Delete the persisted session identifier
    pub async fn clear_session_id(&self) -> Result<()> {
        self.storage.remove_item(USER_UID_KEY).await
    }

    /// Read and decode the cached profile
    pub async fn cached_profile<T>(&self) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.storage.get_item(USER_DATA_KEY).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Overwrite the cached profile with `profile`
    pub async fn save_cached_profile<T>(&self, profile: &T) -> Result<()>
    where
        T: Serialize,
    {
        let text = serde_json::to_string(profile)?;
        self.storage.set_item(USER_DATA_KEY, &text).await
    }
}
