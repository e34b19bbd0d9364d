//! Storage layer for the member app
//!
//! This crate provides the local key-value store and typed access to the
//! persisted session keys.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod session_store;

pub use kv::{KvConfig, KvError, KvStore, LocalStorage};
pub use session_store::{SessionStore, USER_DATA_KEY, USER_UID_KEY};

#[cfg(any(test, feature = "mock"))]
pub use kv::MockLocalStorage;
