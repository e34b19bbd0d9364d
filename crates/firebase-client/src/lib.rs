//! Client for the hosted authentication and realtime database services
//!
//! This crate provides the REST transport, the email/password auth client and
//! point read/write access to the realtime database. Both services sit behind
//! traits ([`AuthProvider`], [`RealtimeDatabase`]) so the app can be driven by
//! mocks in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod database;
pub mod rest;
pub mod types;

pub use auth::{AuthError, AuthErrorCode, AuthProvider, AuthTokens, FirebaseAuth};
pub use database::{user_path, DatabaseError, FirebaseDatabase, RealtimeDatabase};
pub use rest::{RestClient, RestClientConfig, RestError};
pub use types::{Uid, UidError, UserCredential};

#[cfg(any(test, feature = "mock"))]
pub use auth::MockAuthProvider;
#[cfg(any(test, feature = "mock"))]
pub use database::MockRealtimeDatabase;
