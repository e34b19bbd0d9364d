//! Core identity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error building a [`Uid`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UidError {
    /// The identifier is empty
    #[error("User identifier is empty")]
    Empty,

    /// The identifier contains a character that cannot appear in a database key
    #[error("User identifier contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// Opaque user identifier issued by the auth service.
///
/// Also used as a database key, so it must be non-empty and free of
/// `.`, `$`, `#`, `[`, `]`, `/` and control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Validate and wrap an identifier
    pub fn new(value: impl Into<String>) -> Result<Self, UidError> {
        let value = value.into();
        if value.is_empty() {
            return Err(UidError::Empty);
        }
        if let Some(c) = value
            .chars()
            .find(|&c| matches!(c, '.' | '$' | '#' | '[' | ']' | '/') || c.is_control())
        {
            return Err(UidError::ForbiddenChar(c));
        }
        Ok(Self(value))
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Uid {
    type Error = UidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Uid::new(value)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

/// Credential returned by a successful sign-in or account creation
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCredential {
    /// User identifier
    pub uid: Uid,
    /// Email the account was registered with
    pub email: Option<String>,
    /// Short-lived token authorizing database access
    pub id_token: String,
    /// Token for obtaining a fresh id token
    pub refresh_token: String,
    /// When `id_token` stops being accepted
    pub expires_at: DateTime<Utc>,
}

// Tokens stay out of Debug output so credentials can be logged safely.
impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_valid() {
        let uid = Uid::new("kZ3u9XJ2aQhE1mN0pR7sT4vW6yB8").unwrap();
        assert_eq!(uid.as_str(), "kZ3u9XJ2aQhE1mN0pR7sT4vW6yB8");
        assert_eq!(uid.to_string(), "kZ3u9XJ2aQhE1mN0pR7sT4vW6yB8");
    }

    #[test]
    fn test_uid_rejects_empty() {
        assert_eq!(Uid::new(""), Err(UidError::Empty));
    }

    #[test]
    fn test_uid_rejects_path_characters() {
        assert_eq!(Uid::new("abc/def"), Err(UidError::ForbiddenChar('/')));
        assert_eq!(Uid::new("a.b"), Err(UidError::ForbiddenChar('.')));
        assert_eq!(Uid::new("a[0]"), Err(UidError::ForbiddenChar('[')));
    }

    #[test]
    fn test_uid_serde_validates() {
        let uid: Uid = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(uid.as_str(), "abc");
        assert!(serde_json::from_str::<Uid>("\"a/b\"").is_err());
    }

    #[test]
    fn test_credential_debug_hides_tokens() {
        let credential = UserCredential {
            uid: Uid::new("abc").unwrap(),
            email: Some("alice@example.com".to_string()),
            id_token: "secret-id-token".to_string(),
            refresh_token: "secret-refresh".to_string(),
            expires_at: Utc::now(),
        };

        let debug = format!("{:?}", credential);
        assert!(debug.contains("abc"));
        assert!(!debug.contains("secret"));
    }
}
