//! Sign-in and sign-up flows
//!
//! This module validates the login and sign-up forms, delegates credential
//! checks to the [`AuthProvider`], writes the new user's profile record and
//! persists the session identifier. Failures are turned into [`Alert`]s with
//! the exact text the screens show.

use firebase_client::{AuthError, AuthErrorCode, AuthProvider, DatabaseError, Uid, UserCredential};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use app_state::SessionState;

use crate::profiles::{Package, ProfileCache, ProfileError, ProfileRecord};

/// Country prefix added to sign-up phone numbers
pub const DEFAULT_PHONE_PREFIX: &str = "+971";

const VALIDATION_TITLE: &str = "Validation Error";
const LOGIN_FAILED_TITLE: &str = "Login Failed";
const SIGN_UP_FAILED_TITLE: &str = "Sign Up Failed";
const SIGN_UP_SUCCESS_TITLE: &str = "Sign Up Successful";

/// Blocking message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert title
    pub title: String,
    /// Alert body
    pub message: String,
}

impl Alert {
    /// Create a new alert
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Local form validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Login form with an empty field
    #[error("Please enter both your username and password.")]
    MissingCredentials,

    /// Sign-up form with an empty field or no package selected
    #[error("Please fill in all fields.")]
    MissingFields,
}

impl ValidationError {
    /// Alert shown for this failure
    pub fn alert(&self) -> Alert {
        Alert::new(VALIDATION_TITLE, self.to_string())
    }
}

/// Auth flow error types
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// The form was rejected before contacting the provider
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The auth provider rejected the request
    #[error(transparent)]
    Provider(#[from] AuthError),

    /// The profile record could not be written
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Result type for auth flow operations
pub type Result<T> = std::result::Result<T, AuthFlowError>;

impl AuthFlowError {
    /// Alert shown when sign-in fails
    pub fn sign_in_alert(&self) -> Alert {
        match self {
            AuthFlowError::Validation(e) => e.alert(),
            AuthFlowError::Provider(e) => Alert::new(LOGIN_FAILED_TITLE, e.message.clone()),
            AuthFlowError::Profile(e) => Alert::new(LOGIN_FAILED_TITLE, e.to_string()),
        }
    }

    /// Alert shown when sign-up fails
    pub fn sign_up_alert(&self) -> Alert {
        match self {
            AuthFlowError::Validation(e) => e.alert(),
            AuthFlowError::Provider(e) => {
                Alert::new(SIGN_UP_FAILED_TITLE, sign_up_failure_message(&e.code, &e.message))
            }
            AuthFlowError::Profile(ProfileError::Database(DatabaseError::Rest(e)))
                if e.is_network_error() =>
            {
                Alert::new(
                    SIGN_UP_FAILED_TITLE,
                    sign_up_failure_message(&AuthErrorCode::NetworkRequestFailed, e.message()),
                )
            }
            AuthFlowError::Profile(e) => Alert::new(SIGN_UP_FAILED_TITLE, e.to_string()),
        }
    }
}

/// Sign-up failure text for a provider error code.
///
/// Three codes get fixed text; anything else shows `message` as is.
pub fn sign_up_failure_message(code: &AuthErrorCode, message: &str) -> String {
    match code {
        AuthErrorCode::NetworkRequestFailed => {
            "Network error: Please check your internet connection.".to_string()
        }
        AuthErrorCode::InvalidEmail => "The email address is invalid.".to_string(),
        AuthErrorCode::WeakPassword => "The password is too weak.".to_string(),
        _ => message.to_string(),
    }
}

/// Prepend `prefix` to a locally entered phone number.
///
/// A number that already starts with `prefix` has it stripped once first, so
/// the result never carries the prefix twice.
pub fn format_phone_number(input: &str, prefix: &str) -> String {
    let local = input.strip_prefix(prefix).unwrap_or(input);
    format!("{}{}", prefix, local)
}

/// Login form contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    /// Email used as the username
    pub username: String,
    /// Password
    pub password: String,
}

impl SignInForm {
    /// Create a login form
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check that both fields are filled in
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

/// Sign-up form contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Password
    pub password: String,
    /// Phone number as typed, without the country prefix
    pub phone_number: String,
    /// Selected package, if any
    pub package: Option<Package>,
}

impl SignUpForm {
    /// Record a package button press; the latest press wins
    pub fn select_package(&mut self, package: Package) {
        self.package = Some(package);
    }

    /// Check that every field is filled in and a package is selected
    pub fn validate(&self) -> std::result::Result<Package, ValidationError> {
        let blank = [&self.email, &self.name, &self.password, &self.phone_number]
            .iter()
            .any(|field| field.is_empty());

        match self.package {
            Some(package) if !blank => Ok(package),
            _ => Err(ValidationError::MissingFields),
        }
    }
}

/// Successful sign-in
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    /// Credential issued by the provider
    pub credential: UserCredential,
}

/// Successful sign-up
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    /// Credential issued by the provider
    pub credential: UserCredential,
    /// Profile record as read back after the write
    pub profile: ProfileRecord,
    /// Welcome confirmation
    pub welcome: Alert,
}

/// Authentication service
///
/// Runs the sign-in and sign-up flows against an [`AuthProvider`], writes the
/// profile record through the [`ProfileCache`] and persists the session.
///
/// # Example
///
/// ```rust,no_run
/// use app_core::auth::{AuthService, SignInForm};
///
/// # async fn run(auth: AuthService) {
/// match auth.sign_in(&SignInForm::new("alice@example.com", "hunter22")).await {
///     Ok(outcome) => println!("Signed in as {}", outcome.credential.uid),
///     Err(e) => println!("{:?}", e.sign_in_alert()),
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthProvider>,
    profiles: ProfileCache,
    session: SessionState,
    phone_prefix: String,
}

impl AuthService {
    /// Create a new authentication service using [`DEFAULT_PHONE_PREFIX`]
    pub fn new(auth: Arc<dyn AuthProvider>, profiles: ProfileCache, session: SessionState) -> Self {
        Self {
            auth,
            profiles,
            session,
            phone_prefix: DEFAULT_PHONE_PREFIX.to_string(),
        }
    }

    /// Use a different phone prefix
    pub fn with_phone_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.phone_prefix = prefix.into();
        self
    }

    /// Phone prefix applied at sign-up
    pub fn phone_prefix(&self) -> &str {
        &self.phone_prefix
    }

    /// Sign in with the login form
    ///
    /// # Errors
    ///
    /// - `AuthFlowError::Validation` - A field is empty; the provider is not called
    /// - `AuthFlowError::Provider` - The provider rejected the credentials
    pub async fn sign_in(&self, form: &SignInForm) -> Result<SignInOutcome> {
        form.validate()?;

        let credential = self
            .auth
            .sign_in_with_email_and_password(&form.username, &form.password)
            .await
            .map_err(|e| {
                tracing::error!("Sign in failed: {}", e.code.as_str());
                e
            })?;

        if let Err(e) = self.session.persist(&credential.uid).await {
            tracing::error!("Failed to persist session: {}", e);
        }

        tracing::info!(uid = %credential.uid, "signed in");
        Ok(SignInOutcome { credential })
    }

    /// Create an account from the sign-up form
    ///
    /// The account is created first, then the profile record is written. If
    /// the write fails the account is left without a record and the session
    /// is not persisted.
    ///
    /// # Errors
    ///
    /// - `AuthFlowError::Validation` - A field is empty or no package is selected
    /// - `AuthFlowError::Provider` - Account creation failed
    /// - `AuthFlowError::Profile` - The profile record could not be written
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SignUpOutcome> {
        let package = form.validate()?;

        let credential = self
            .auth
            .create_user_with_email_and_password(&form.email, &form.password)
            .await
            .map_err(|e| {
                tracing::error!("Account creation failed: {}", e.code.as_str());
                e
            })?;
        let uid = &credential.uid;

        let record = ProfileRecord::new(
            form.name.clone(),
            form.email.clone(),
            format_phone_number(&form.phone_number, &self.phone_prefix),
            package,
        );

        if let Err(e) = self.profiles.write(uid, &record).await {
            tracing::error!(uid = %uid, "Failed to write profile record: {}", e);
            return Err(e.into());
        }

        if let Err(e) = self.session.persist(uid).await {
            tracing::error!("Failed to persist session: {}", e);
        }

        let profile = match self.profiles.refresh(uid).await {
            Ok(Some(profile)) => profile,
            Ok(None) => self.mirror_written(record).await,
            Err(e) => {
                tracing::error!("Failed to refresh profile cache: {}", e);
                self.mirror_written(record).await
            }
        };

        let email = credential.email.as_deref().unwrap_or(&form.email);
        let welcome = Alert::new(SIGN_UP_SUCCESS_TITLE, format!("Welcome {}", email));

        tracing::info!(uid = %uid, "account created");
        Ok(SignUpOutcome {
            credential,
            profile,
            welcome,
        })
    }

    /// Restore the provider session of a returning user.
    ///
    /// The database rejects unauthenticated reads, so this runs before the
    /// landing page fetches the profile. Failures are logged; the caller
    /// carries on with whatever session it has.
    pub async fn restore_session(&self) -> Option<Uid> {
        let restored = match self.auth.restore_session().await {
            Ok(uid) => uid,
            Err(e) => {
                tracing::warn!("Failed to restore auth session: {}", e.code.as_str());
                return None;
            }
        };

        match (&restored, self.session.current_uid().await) {
            (Some(restored), Ok(Some(stored))) if *restored != stored => {
                tracing::warn!(restored = %restored, stored = %stored, "auth session belongs to another user");
            }
            (None, _) => tracing::debug!("no auth session to restore"),
            _ => {}
        }
        restored
    }

    /// End the provider session; a failure is logged
    pub async fn sign_out(&self) {
        if let Err(e) = self.auth.sign_out().await {
            tracing::error!("Failed to clear auth session: {}", e);
        }
    }

    /// Cache the record just written when it could not be read back
    async fn mirror_written(&self, record: ProfileRecord) -> ProfileRecord {
        if let Err(e) = self.profiles.mirror(&record).await {
            tracing::error!("Failed to cache written profile: {}", e);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use firebase_client::{MockAuthProvider, MockRealtimeDatabase, RestError};
    use serde_json::json;
    use storage::{KvStore, SessionStore, USER_DATA_KEY, USER_UID_KEY};

    fn credential(uid: &str, email: &str) -> UserCredential {
        UserCredential {
            uid: Uid::new(uid).unwrap(),
            email: Some(email.to_string()),
            id_token: "id-token".to_string(),
            refresh_token: "refresh-token".to_string(),
            expires_at: Utc::now(),
        }
    }

    fn service(auth: MockAuthProvider, db: MockRealtimeDatabase) -> (AuthService, Arc<KvStore>) {
        let kv = Arc::new(KvStore::in_memory().unwrap());
        let store = SessionStore::new(kv.clone());
        let profiles = ProfileCache::new(Arc::new(db), store.clone());
        let service = AuthService::new(Arc::new(auth), profiles, SessionState::new(store));
        (service, kv)
    }

    fn filled_sign_up() -> SignUpForm {
        let mut form = SignUpForm {
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            password: "hunter22".to_string(),
            phone_number: "501234567".to_string(),
            package: None,
        };
        form.select_package(Package::Silver);
        form
    }

    #[test]
    fn test_format_phone_number() {
        assert_eq!(format_phone_number("501234567", "+971"), "+971501234567");
        assert_eq!(format_phone_number("+971501234567", "+971"), "+971501234567");
        assert_eq!(format_phone_number("+971+971501", "+971"), "+971+971501");
        assert_eq!(format_phone_number("", "+971"), "+971");
    }

    #[test]
    fn test_sign_in_form_validation() {
        assert!(SignInForm::new("a@b.c", "pw").validate().is_ok());
        assert_eq!(
            SignInForm::new("", "pw").validate(),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            SignInForm::new("a@b.c", "").validate(),
            Err(ValidationError::MissingCredentials)
        );
    }

    #[test]
    fn test_sign_up_form_validation() {
        assert_eq!(filled_sign_up().validate(), Ok(Package::Silver));

        let mut form = filled_sign_up();
        form.package = None;
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));

        let mut form = filled_sign_up();
        form.phone_number.clear();
        assert_eq!(form.validate(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_latest_package_selection_wins() {
        let mut form = filled_sign_up();
        form.select_package(Package::Bronze);
        form.select_package(Package::Platinum);
        assert_eq!(form.validate(), Ok(Package::Platinum));
    }

    #[test]
    fn test_sign_up_failure_messages() {
        assert_eq!(
            sign_up_failure_message(&AuthErrorCode::NetworkRequestFailed, "raw"),
            "Network error: Please check your internet connection."
        );
        assert_eq!(
            sign_up_failure_message(&AuthErrorCode::InvalidEmail, "raw"),
            "The email address is invalid."
        );
        assert_eq!(
            sign_up_failure_message(&AuthErrorCode::WeakPassword, "raw"),
            "The password is too weak."
        );
        assert_eq!(
            sign_up_failure_message(&AuthErrorCode::EmailAlreadyInUse, "already used"),
            "already used"
        );
    }

    #[test]
    fn test_validation_alerts() {
        assert_eq!(
            ValidationError::MissingCredentials.alert(),
            Alert::new("Validation Error", "Please enter both your username and password.")
        );
        assert_eq!(
            ValidationError::MissingFields.alert(),
            Alert::new("Validation Error", "Please fill in all fields.")
        );
    }

    #[tokio::test]
    async fn test_sign_in_empty_field_skips_provider() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in_with_email_and_password().never();

        let (service, kv) = service(auth, MockRealtimeDatabase::new());
        let err = service
            .sign_in(&SignInForm::new("alice@example.com", ""))
            .await
            .unwrap_err();

        assert_eq!(
            err.sign_in_alert(),
            Alert::new("Validation Error", "Please enter both your username and password.")
        );
        assert_eq!(kv.get_text(USER_UID_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_in_persists_returned_uid() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in_with_email_and_password()
            .times(1)
            .returning(|email, password| {
                assert_eq!(email, "alice@example.com");
                assert_eq!(password, "hunter22");
                Ok(credential("uid-alice", email))
            });

        let (service, kv) = service(auth, MockRealtimeDatabase::new());
        let outcome = service
            .sign_in(&SignInForm::new("alice@example.com", "hunter22"))
            .await
            .unwrap();

        assert_eq!(outcome.credential.uid.as_str(), "uid-alice");
        assert_eq!(kv.get_text(USER_UID_KEY).unwrap(), Some("uid-alice".to_string()));
    }

    #[tokio::test]
    async fn test_sign_in_failure_shows_provider_message() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_in_with_email_and_password()
            .times(1)
            .returning(|_, _| Err(AuthError::from_code(AuthErrorCode::InvalidCredential)));

        let (service, kv) = service(auth, MockRealtimeDatabase::new());
        let err = service
            .sign_in(&SignInForm::new("alice@example.com", "wrong"))
            .await
            .unwrap_err();

        let alert = err.sign_in_alert();
        assert_eq!(alert.title, "Login Failed");
        assert_eq!(
            alert.message,
            AuthError::from_code(AuthErrorCode::InvalidCredential).message
        );
        assert_eq!(kv.get_text(USER_UID_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_up_missing_field_skips_provider() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_user_with_email_and_password().never();

        let (service, _kv) = service(auth, MockRealtimeDatabase::new());
        let mut form = filled_sign_up();
        form.name.clear();

        let err = service.sign_up(&form).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::Validation(ValidationError::MissingFields)));
    }

    #[tokio::test]
    async fn test_sign_up_writes_record_and_persists_session() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_user_with_email_and_password()
            .times(1)
            .returning(|email, _| Ok(credential("uid-new", email)));

        let expected = json!({
            "name": "Alice",
            "usermail": "alice@example.com",
            "phoneNumber": "+971501234567",
            "package": "Silver"
        });

        let mut db = MockRealtimeDatabase::new();
        let written = expected.clone();
        db.expect_set().times(1).returning(move |path, value| {
            assert_eq!(path, "/users/uid-new");
            assert_eq!(value, written);
            assert!(value.get("password").is_none());
            Ok(())
        });
        let stored = expected.clone();
        db.expect_get()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let (service, kv) = service(auth, db);
        let outcome = service.sign_up(&filled_sign_up()).await.unwrap();

        assert_eq!(
            outcome.welcome,
            Alert::new("Sign Up Successful", "Welcome alice@example.com")
        );
        assert_eq!(outcome.profile.package, Some(Package::Silver));
        assert_eq!(kv.get_text(USER_UID_KEY).unwrap(), Some("uid-new".to_string()));
        assert!(kv.get_text(USER_DATA_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_up_custom_prefix() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_user_with_email_and_password()
            .returning(|email, _| Ok(credential("uid-new", email)));

        let mut db = MockRealtimeDatabase::new();
        db.expect_set().times(1).returning(|_, value| {
            assert_eq!(value["phoneNumber"], "+44501234567");
            Ok(())
        });
        db.expect_get().returning(|_| Ok(None));

        let (service, _kv) = service(auth, db);
        let service = service.with_phone_prefix("+44");
        assert_eq!(service.phone_prefix(), "+44");

        let outcome = service.sign_up(&filled_sign_up()).await.unwrap();
        assert_eq!(outcome.profile.phone_number.as_deref(), Some("+44501234567"));
    }

    #[tokio::test]
    async fn test_sign_up_caches_written_record_when_read_back_fails() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_user_with_email_and_password()
            .times(1)
            .returning(|email, _| Ok(credential("uid-new", email)));

        let mut db = MockRealtimeDatabase::new();
        db.expect_set().times(1).returning(|_, _| Ok(()));
        db.expect_get()
            .times(1)
            .returning(|_| Err(DatabaseError::Rest(RestError::network("offline"))));

        let (service, kv) = service(auth, db);
        let outcome = service.sign_up(&filled_sign_up()).await.unwrap();

        let text = kv.get_text(USER_DATA_KEY).unwrap().unwrap();
        let cached: ProfileRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(cached, outcome.profile);
        assert_eq!(cached.display_name(), "Alice");
        assert_eq!(cached.package, Some(Package::Silver));
    }

    #[tokio::test]
    async fn test_sign_up_weak_password_alert() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_user_with_email_and_password()
            .times(1)
            .returning(|_, _| Err(AuthError::from_code(AuthErrorCode::WeakPassword)));

        let mut db = MockRealtimeDatabase::new();
        db.expect_set().never();

        let (service, _kv) = service(auth, db);
        let err = service.sign_up(&filled_sign_up()).await.unwrap_err();

        assert_eq!(
            err.sign_up_alert(),
            Alert::new("Sign Up Failed", "The password is too weak.")
        );
    }

    #[tokio::test]
    async fn test_sign_up_record_write_failure_leaves_session_empty() {
        let mut auth = MockAuthProvider::new();
        auth.expect_create_user_with_email_and_password()
            .times(1)
            .returning(|email, _| Ok(credential("uid-orphan", email)));

        let mut db = MockRealtimeDatabase::new();
        db.expect_set()
            .times(1)
            .returning(|_, _| Err(DatabaseError::Rest(RestError::network("offline"))));
        db.expect_get().never();

        let (service, kv) = service(auth, db);
        let err = service.sign_up(&filled_sign_up()).await.unwrap_err();

        assert_eq!(
            err.sign_up_alert(),
            Alert::new(
                "Sign Up Failed",
                "Network error: Please check your internet connection."
            )
        );
        assert_eq!(kv.get_text(USER_UID_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_session_returns_provider_uid() {
        let mut auth = MockAuthProvider::new();
        auth.expect_restore_session()
            .times(1)
            .returning(|| Ok(Some(Uid::new("uid-alice").unwrap())));

        let (service, kv) = service(auth, MockRealtimeDatabase::new());
        kv.set_text(USER_UID_KEY, "uid-alice").unwrap();

        assert_eq!(service.restore_session().await, Some(Uid::new("uid-alice").unwrap()));
    }

    #[tokio::test]
    async fn test_restore_session_failure_is_swallowed() {
        let mut auth = MockAuthProvider::new();
        auth.expect_restore_session()
            .times(1)
            .returning(|| Err(AuthError::from_code(AuthErrorCode::UserTokenExpired)));

        let (service, kv) = service(auth, MockRealtimeDatabase::new());
        kv.set_text(USER_UID_KEY, "uid-alice").unwrap();

        assert_eq!(service.restore_session().await, None);
        // The app session is left for the caller to decide on
        assert_eq!(kv.get_text(USER_UID_KEY).unwrap(), Some("uid-alice".to_string()));
    }

    #[tokio::test]
    async fn test_sign_out_calls_provider() {
        let mut auth = MockAuthProvider::new();
        auth.expect_sign_out()
            .times(1)
            .returning(|| Err(AuthError::new(AuthErrorCode::Other("storage".to_string()), "disk full")));

        let (service, _kv) = service(auth, MockRealtimeDatabase::new());
        service.sign_out().await;
    }
}
