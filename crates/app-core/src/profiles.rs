//! User profile records and their local cache
//!
//! The profile record lives in the realtime database under `/users/<uid>`.
//! A copy of the last fetched record is mirrored into local storage so the
//! profile screen can render without a network round trip.

use firebase_client::{user_path, DatabaseError, RealtimeDatabase, Uid};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use storage::{KvError, SessionStore};
use thiserror::Error;

/// Text shown when the profile has no name
pub const NAME_PLACEHOLDER: &str = "Name not available";

/// Text shown when the profile has no email
pub const EMAIL_PLACEHOLDER: &str = "Email not available";

/// Profile service error types
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Local storage error
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Membership tier chosen at sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Package {
    /// Entry tier
    Bronze,
    /// Second tier
    Silver,
    /// Third tier
    Gold,
    /// Top tier
    Platinum,
}

impl Package {
    /// All packages in display order
    pub const ALL: [Package; 4] = [
        Package::Bronze,
        Package::Silver,
        Package::Gold,
        Package::Platinum,
    ];

    /// Name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Package::Bronze => "Bronze",
            Package::Silver => "Silver",
            Package::Gold => "Gold",
            Package::Platinum => "Platinum",
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package name that is not one of [`Package::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown package: {0}")]
pub struct UnknownPackage(pub String);

impl FromStr for Package {
    type Err = UnknownPackage;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Package::ALL
            .into_iter()
            .find(|package| package.as_str() == s)
            .ok_or_else(|| UnknownPackage(s.to_string()))
    }
}

/// Accepts any JSON for a text field. Numbers and booleans are kept as their
/// text form; arrays, objects and null read as `None`.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accepts any JSON for `package`; anything but a known name reads as `None`.
fn lenient_package<'de, D>(deserializer: D) -> std::result::Result<Option<Package>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok()))
}

/// Profile record stored under `/users/<uid>`
///
/// Every field is optional on read and a field of the wrong JSON type never
/// fails the whole record; records written by older clients or edited by hand
/// may be incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Display name
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// Email address
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub usermail: Option<String>,
    /// Phone number including the country prefix
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<String>,
    /// Membership package
    #[serde(
        default,
        deserialize_with = "lenient_package",
        skip_serializing_if = "Option::is_none"
    )]
    pub package: Option<Package>,
}

impl ProfileRecord {
    /// Build a complete record
    pub fn new(
        name: impl Into<String>,
        usermail: impl Into<String>,
        phone_number: impl Into<String>,
        package: Package,
    ) -> Self {
        Self {
            name: Some(name.into()),
            usermail: Some(usermail.into()),
            phone_number: Some(phone_number.into()),
            package: Some(package),
        }
    }

    /// Name, or a placeholder when missing
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NAME_PLACEHOLDER)
    }

    /// Email, or a placeholder when missing
    pub fn display_email(&self) -> &str {
        self.usermail.as_deref().unwrap_or(EMAIL_PLACEHOLDER)
    }

    /// Package name, empty when missing
    pub fn package_label(&self) -> &'static str {
        self.package.map(|p| p.as_str()).unwrap_or("")
    }
}

/// Reads profile records from the database and mirrors them locally
#[derive(Clone)]
pub struct ProfileCache {
    database: Arc<dyn RealtimeDatabase>,
    store: SessionStore,
}

impl ProfileCache {
    /// Create a new profile cache
    pub fn new(database: Arc<dyn RealtimeDatabase>, store: SessionStore) -> Self {
        Self { database, store }
    }

    /// Write `record` as the user's profile
    pub async fn write(&self, uid: &Uid, record: &ProfileRecord) -> Result<()> {
        let value = serde_json::to_value(record)?;
        self.database.set(&user_path(uid), value).await?;
        Ok(())
    }

    /// Fetch the user's profile and overwrite the local copy with it.
    ///
    /// Returns `None` when the database holds no record; the local copy is
    /// left untouched in that case.
    pub async fn refresh(&self, uid: &Uid) -> Result<Option<ProfileRecord>> {
        let Some(value) = self.database.get(&user_path(uid)).await? else {
            tracing::warn!(uid = %uid, "no profile record found");
            return Ok(None);
        };

        let record: ProfileRecord = serde_json::from_value(value)?;
        self.mirror(&record).await?;
        tracing::debug!(uid = %uid, "profile cache refreshed");

        Ok(Some(record))
    }

    /// Overwrite the local copy with `record` without fetching
    pub async fn mirror(&self, record: &ProfileRecord) -> Result<()> {
        self.store.save_cached_profile(record).await?;
        Ok(())
    }

    /// Last fetched profile, read from local storage only
    pub async fn cached(&self) -> Option<ProfileRecord> {
        match self.store.cached_profile::<ProfileRecord>().await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("Failed to read cached profile: {}", e);
                None
            }
        }
    }
}
