//! Core application logic for the member app
//!
//! This crate contains the sign-in and sign-up flows, their form validation
//! and user-facing error text, and the profile record with its local cache.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod profiles;

pub use auth::{
    format_phone_number, sign_up_failure_message, Alert, AuthFlowError, AuthService,
    SignInForm, SignInOutcome, SignUpForm, SignUpOutcome, ValidationError,
    DEFAULT_PHONE_PREFIX,
};
pub use profiles::{Package, ProfileCache, ProfileError, ProfileRecord, UnknownPackage};
