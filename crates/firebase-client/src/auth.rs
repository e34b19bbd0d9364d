//! Email/password authentication against the hosted auth service
//!
//! [`AuthProvider`] is the seam the app depends on; [`FirebaseAuth`] talks to
//! the Identity Toolkit REST API. With persistence enabled, the signed-in
//! user's refresh token is kept in local storage and exchanged for a fresh id
//! token on the next launch.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::LocalStorage;
use thiserror::Error;

use crate::rest::{RestClient, RestError, RestRequest};
use crate::types::{Uid, UserCredential};

/// Lifetime assumed when the service omits `expiresIn`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Local storage key holding the persisted auth user.
///
/// Kept apart from the app's own session keys.
pub const AUTH_USER_KEY: &str = "firebase:authUser";

/// Discriminated error codes surfaced by the auth service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// No response from the service
    NetworkRequestFailed,
    /// Malformed email address
    InvalidEmail,
    /// Password rejected by the service's strength policy
    WeakPassword,
    /// An account already exists for the email
    EmailAlreadyInUse,
    /// Unknown email or wrong password
    InvalidCredential,
    /// The account was disabled by an administrator
    UserDisabled,
    /// Too many failed attempts
    TooManyRequests,
    /// Email/password sign-in is disabled for the project
    OperationNotAllowed,
    /// The refresh token was revoked or expired, or the user was deleted
    UserTokenExpired,
    /// Any other provider code, kept verbatim
    Other(String),
}

impl AuthErrorCode {
    /// Map a raw service message such as `WEAK_PASSWORD : Password should be...`
    pub fn from_provider_message(message: &str) -> Self {
        let raw = message.split(" : ").next().unwrap_or(message).trim();
        match raw {
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
            "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "MISSING_PASSWORD" => {
                AuthErrorCode::InvalidCredential
            }
            "USER_DISABLED" => AuthErrorCode::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
            "OPERATION_NOT_ALLOWED" => AuthErrorCode::OperationNotAllowed,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
                AuthErrorCode::UserTokenExpired
            }
            other => AuthErrorCode::Other(other.to_string()),
        }
    }

    /// Namespaced code, e.g. `auth/invalid-email`
    pub fn as_str(&self) -> &str {
        match self {
            AuthErrorCode::NetworkRequestFailed => "auth/network-request-failed",
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::InvalidCredential => "auth/invalid-credential",
            AuthErrorCode::UserDisabled => "auth/user-disabled",
            AuthErrorCode::TooManyRequests => "auth/too-many-requests",
            AuthErrorCode::OperationNotAllowed => "auth/operation-not-allowed",
            AuthErrorCode::UserTokenExpired => "auth/user-token-expired",
            AuthErrorCode::Other(code) => code,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            AuthErrorCode::NetworkRequestFailed => {
                "A network error (such as timeout, interrupted connection or unreachable host) has occurred."
            }
            AuthErrorCode::InvalidEmail => "The email address is badly formatted.",
            AuthErrorCode::WeakPassword => "The given password is invalid.",
            AuthErrorCode::EmailAlreadyInUse => {
                "The email address is already in use by another account."
            }
            AuthErrorCode::InvalidCredential => {
                "The supplied auth credential is incorrect, malformed or has expired."
            }
            AuthErrorCode::UserDisabled => {
                "The user account has been disabled by an administrator."
            }
            AuthErrorCode::TooManyRequests => {
                "We have blocked all requests from this device due to unusual activity. Try again later."
            }
            AuthErrorCode::OperationNotAllowed => {
                "This operation is not allowed. Enable the sign-in provider for this project."
            }
            AuthErrorCode::UserTokenExpired => {
                "The user's credential is no longer valid. The user must sign in again."
            }
            AuthErrorCode::Other(_) => "An internal error has occurred.",
        }
    }
}

/// Failure reported by an [`AuthProvider`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    /// Discriminated code
    pub code: AuthErrorCode,
    /// Human-readable message, shown to the user verbatim
    pub message: String,
}

impl AuthError {
    /// Create an error with an explicit message
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Create an error with the standard message for `code`
    pub fn from_code(code: AuthErrorCode) -> Self {
        let message = format!("[{}] {}", code.as_str(), code.describe());
        Self { code, message }
    }
}

impl From<RestError> for AuthError {
    fn from(err: RestError) -> Self {
        if err.is_network_error() {
            return AuthError::from_code(AuthErrorCode::NetworkRequestFailed);
        }

        match AuthErrorCode::from_provider_message(err.message()) {
            AuthErrorCode::Other(raw) => {
                AuthError::new(AuthErrorCode::Other(raw), format!("[auth/internal-error] {}", err.message()))
            }
            code => AuthError::from_code(code),
        }
    }
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// External authentication service operations consumed by the app
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential>;

    /// Verify credentials and sign in
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential>;

    /// Restore the user signed in during a previous run and refresh its id
    /// token. Returns `None` when no user was persisted.
    async fn restore_session(&self) -> Result<Option<Uid>>;

    /// Forget the signed-in user
    async fn sign_out(&self) -> Result<()>;
}

/// Id token of the most recently signed-in user.
///
/// Shared between [`FirebaseAuth`] (writer) and the database client (reader).
#[derive(Debug, Clone, Default)]
pub struct AuthTokens {
    id_token: Arc<RwLock<Option<String>>>,
}

impl AuthTokens {
    /// Create an empty token holder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current id token
    pub fn set(&self, id_token: impl Into<String>) {
        *self.id_token.write() = Some(id_token.into());
    }

    /// Get the current id token
    pub fn current(&self) -> Option<String> {
        self.id_token.read().clone()
    }

    /// Forget the current id token
    pub fn clear(&self) {
        *self.id_token.write() = None;
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Secure Token API response; unlike the account endpoints it is snake_case
#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Auth user as persisted between runs
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedUser {
    uid: String,
    refresh_token: String,
}

/// Local persistence of the signed-in user plus the token endpoint used to
/// restore it
#[derive(Clone)]
struct SessionPersistence {
    storage: Arc<dyn LocalStorage>,
    token_client: RestClient,
}

impl SessionPersistence {
    /// Unreadable entries are logged and treated as absent
    async fn load(&self) -> Option<PersistedUser> {
        let text = match self.storage.get_item(AUTH_USER_KEY).await {
            Ok(text) => text?,
            Err(e) => {
                tracing::warn!("Failed to read persisted auth user: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Discarding malformed persisted auth user: {}", e);
                None
            }
        }
    }

    async fn save(&self, uid: &Uid, refresh_token: &str) {
        let user = PersistedUser {
            uid: uid.to_string(),
            refresh_token: refresh_token.to_string(),
        };

        let result = match serde_json::to_string(&user) {
            Ok(text) => self.storage.set_item(AUTH_USER_KEY, &text).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::warn!(uid = %uid, "Failed to persist auth user: {}", e);
        }
    }

    async fn clear(&self) -> Result<()> {
        self.storage.remove_item(AUTH_USER_KEY).await.map_err(|e| {
            AuthError::new(
                AuthErrorCode::Other("storage".to_string()),
                format!("[auth/internal-error] {}", e),
            )
        })
    }
}

fn invalid_uid(err: crate::types::UidError) -> AuthError {
    AuthError::new(
        AuthErrorCode::Other("invalid-uid".to_string()),
        format!("[auth/internal-error] {}", err),
    )
}

fn token_lifetime(expires_in: Option<&str>) -> Duration {
    let secs = expires_in
        .and_then(|secs| secs.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Duration::seconds(secs)
}

/// [`AuthProvider`] backed by the Identity Toolkit REST API
#[derive(Clone)]
pub struct FirebaseAuth {
    client: RestClient,
    api_key: String,
    tokens: AuthTokens,
    persistence: Option<SessionPersistence>,
}

impl FirebaseAuth {
    /// Create a new auth client
    ///
    /// # Arguments
    ///
    /// * `client` - REST client pointed at the auth service
    /// * `api_key` - Project web API key
    /// * `tokens` - Token holder shared with the database client
    pub fn new(client: RestClient, api_key: impl Into<String>, tokens: AuthTokens) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            tokens,
            persistence: None,
        }
    }

    /// Keep the signed-in user in `storage` so a later run can restore it
    ///
    /// `token_client` must point at the Secure Token service.
    pub fn with_persistence(mut self, storage: Arc<dyn LocalStorage>, token_client: RestClient) -> Self {
        self.persistence = Some(SessionPersistence {
            storage,
            token_client,
        });
        self
    }

    async fn password_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<UserCredential> {
        let request = RestRequest::post(format!("/v1/accounts:{}", endpoint))
            .param("key", self.api_key.as_str())
            .json_body(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .map_err(|e| AuthError::new(AuthErrorCode::Other("serialization".to_string()), e.to_string()))?;

        let response = self.client.send::<PasswordResponse>(request).await?;
        let data = response.data;

        let uid = Uid::new(data.local_id).map_err(invalid_uid)?;
        let expires_at = Utc::now() + token_lifetime(data.expires_in.as_deref());

        self.tokens.set(data.id_token.clone());
        if let Some(persistence) = &self.persistence {
            if !data.refresh_token.is_empty() {
                persistence.save(&uid, &data.refresh_token).await;
            }
        }

        Ok(UserCredential {
            uid,
            email: data.email,
            id_token: data.id_token,
            refresh_token: data.refresh_token,
            expires_at,
        })
    }

    async fn refresh(&self, persistence: &SessionPersistence, user: &PersistedUser) -> Result<Uid> {
        let request = RestRequest::post("/v1/token")
            .param("key", self.api_key.as_str())
            .form_body(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", user.refresh_token.as_str()),
            ]);

        let data = persistence
            .token_client
            .send::<RefreshResponse>(request)
            .await?
            .data;

        let uid = Uid::new(data.user_id).map_err(invalid_uid)?;
        if uid.as_str() != user.uid {
            tracing::warn!(persisted = %user.uid, refreshed = %uid, "refreshed token belongs to another user");
        }
        self.tokens.set(data.id_token);
        persistence.save(&uid, &data.refresh_token).await;

        tracing::debug!(
            uid = %uid,
            expires_in = token_lifetime(data.expires_in.as_deref()).num_seconds(),
            "id token refreshed"
        );
        Ok(uid)
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential> {
        self.password_request("signUp", email, password).await
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential> {
        self.password_request("signInWithPassword", email, password).await
    }

    async fn restore_session(&self) -> Result<Option<Uid>> {
        let Some(persistence) = &self.persistence else {
            return Ok(None);
        };
        let Some(user) = persistence.load().await else {
            return Ok(None);
        };

        match self.refresh(persistence, &user).await {
            Ok(uid) => Ok(Some(uid)),
            Err(e) => {
                // A dead refresh token never recovers
                if e.code == AuthErrorCode::UserTokenExpired {
                    persistence.clear().await?;
                }
                Err(e)
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        self.tokens.clear();
        if let Some(persistence) = &self.persistence {
            persistence.clear().await?;
        }
        tracing::debug!("auth session cleared");
        Ok(())
    }
}
