//! Point reads and writes against the hosted realtime database
//!
//! Only whole-record reads and writes at a single path are supported; no
//! listeners, queries or multi-path transactions.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthTokens;
use crate::rest::{RestClient, RestError, RestRequest};
use crate::types::Uid;

/// Database error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    /// The service refused the request for the current user
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The path cannot be addressed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Transport or service failure
    #[error(transparent)]
    Rest(#[from] RestError),
}

/// Result type for database operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Path of a user's profile record
pub fn user_path(uid: &Uid) -> String {
    format!("/users/{}", uid)
}

/// External database operations consumed by the app
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait RealtimeDatabase: Send + Sync {
    /// Replace the value stored at `path`
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Read the value stored at `path`; `None` when nothing is stored
    async fn get(&self, path: &str) -> Result<Option<Value>>;
}

/// Reject paths the database would refuse or misinterpret
fn validate_path(path: &str) -> Result<()> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(DatabaseError::InvalidPath(path.to_string()));
    };

    let bad_segment = rest.split('/').any(|segment| {
        segment.is_empty()
            || segment
                .chars()
                .any(|c| matches!(c, '.' | '$' | '#' | '[' | ']') || c.is_control())
    });

    if bad_segment {
        return Err(DatabaseError::InvalidPath(path.to_string()));
    }

    Ok(())
}

/// [`RealtimeDatabase`] backed by the database REST API
#[derive(Debug, Clone)]
pub struct FirebaseDatabase {
    client: RestClient,
    tokens: AuthTokens,
}

impl FirebaseDatabase {
    /// Create a new database client
    ///
    /// Requests carry the id token currently held by `tokens`, if any.
    pub fn new(client: RestClient, tokens: AuthTokens) -> Self {
        Self { client, tokens }
    }

    fn request(&self, request: RestRequest) -> RestRequest {
        match self.tokens.current() {
            Some(token) => request.param("auth", token),
            None => request,
        }
    }

    fn map_error(err: RestError) -> DatabaseError {
        if err.is_unauthorized() {
            DatabaseError::PermissionDenied(err.message().to_string())
        } else {
            DatabaseError::Rest(err)
        }
    }
}

#[async_trait]
impl RealtimeDatabase for FirebaseDatabase {
    async fn set(&self, path: &str, value: Value) -> Result<()> {
        validate_path(path)?;

        let request = self
            .request(RestRequest::put(format!("{}.json", path)))
            .json_body(&value)
            .map_err(|e| DatabaseError::Rest(RestError::new(0, "SerializeError", e.to_string())))?;

        self.client
            .send::<Value>(request)
            .await
            .map_err(Self::map_error)?;

        tracing::debug!(path, "database write complete");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>> {
        validate_path(path)?;

        let request = self.request(RestRequest::get(format!("{}.json", path)));
        let response = self
            .client
            .send::<Value>(request)
            .await
            .map_err(Self::map_error)?;

        Ok(match response.data {
            Value::Null => None,
            value => Some(value),
        })
    }
}
