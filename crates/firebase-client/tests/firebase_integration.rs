//! Integration tests for the auth and database REST adapters
//!
//! These tests use wiremock to stand in for the hosted services and exercise
//! the full request/response cycle and error mapping.

use firebase_client::auth::AUTH_USER_KEY;
use firebase_client::{
    AuthErrorCode, AuthProvider, AuthTokens, DatabaseError, FirebaseAuth, FirebaseDatabase,
    RealtimeDatabase, RestClient, RestClientConfig,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use storage::KvStore;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn auth_client(server: &MockServer, tokens: AuthTokens) -> FirebaseAuth {
    let client = RestClient::new(RestClientConfig::new(server.uri())).unwrap();
    FirebaseAuth::new(client, "test-api-key", tokens)
}

fn persisting_auth_client(server: &MockServer, tokens: AuthTokens, kv: Arc<KvStore>) -> FirebaseAuth {
    let token_client = RestClient::new(RestClientConfig::new(server.uri())).unwrap();
    auth_client(server, tokens).with_persistence(kv, token_client)
}

fn database_client(server: &MockServer, tokens: AuthTokens) -> FirebaseDatabase {
    let client = RestClient::new(RestClientConfig::new(server.uri())).unwrap();
    FirebaseDatabase::new(client, tokens)
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_sign_in_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-api-key"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "password": "hunter22",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-alice",
            "email": "alice@example.com",
            "idToken": "id-token-1",
            "refreshToken": "refresh-1",
            "expiresIn": "3600"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = AuthTokens::new();
    let auth = auth_client(&server, tokens.clone());

    let credential = auth
        .sign_in_with_email_and_password("alice@example.com", "hunter22")
        .await
        .unwrap();

    assert_eq!(credential.uid.as_str(), "uid-alice");
    assert_eq!(credential.email.as_deref(), Some("alice@example.com"));
    assert_eq!(tokens.current(), Some("id-token-1".to_string()));
}

#[tokio::test]
async fn test_create_account_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-new",
            "email": "new@example.com",
            "idToken": "id-token-new",
            "refreshToken": "refresh-new",
            "expiresIn": "3600"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = auth_client(&server, AuthTokens::new());
    let credential = auth
        .create_user_with_email_and_password("new@example.com", "secret1")
        .await
        .unwrap();

    assert_eq!(credential.uid.as_str(), "uid-new");
}

#[tokio::test]
async fn test_sign_up_weak_password() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "WEAK_PASSWORD : Password should be at least 6 characters"
            }
        })))
        .mount(&server)
        .await;

    let auth = auth_client(&server, AuthTokens::new());
    let err = auth
        .create_user_with_email_and_password("new@example.com", "123")
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::WeakPassword);
}

#[tokio::test]
async fn test_sign_in_invalid_credentials_keeps_token_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
        })))
        .mount(&server)
        .await;

    let tokens = AuthTokens::new();
    let auth = auth_client(&server, tokens.clone());
    let err = auth
        .sign_in_with_email_and_password("alice@example.com", "wrong")
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::InvalidCredential);
    assert!(err.message.starts_with("[auth/invalid-credential]"));
    assert_eq!(tokens.current(), None);
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = RestClient::new(
        RestClientConfig::new(server.uri()).with_timeout(Duration::from_millis(100)),
    )
    .unwrap();
    let auth = FirebaseAuth::new(client, "test-api-key", AuthTokens::new());

    let err = auth
        .sign_in_with_email_and_password("alice@example.com", "hunter22")
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::NetworkRequestFailed);
}

// =============================================================================
// Session persistence
// =============================================================================

#[tokio::test]
async fn test_sign_in_persists_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-alice",
            "email": "alice@example.com",
            "idToken": "id-token-1",
            "refreshToken": "refresh-1",
            "expiresIn": "3600"
        })))
        .mount(&server)
        .await;

    let kv = Arc::new(KvStore::in_memory().unwrap());
    let auth = persisting_auth_client(&server, AuthTokens::new(), kv.clone());
    auth.sign_in_with_email_and_password("alice@example.com", "hunter22")
        .await
        .unwrap();

    let stored: serde_json::Value =
        serde_json::from_str(&kv.get_text(AUTH_USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored, json!({"uid": "uid-alice", "refreshToken": "refresh-1"}));
}

#[tokio::test]
async fn test_restore_session_refreshes_id_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .and(query_param("key", "test-api-key"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string("grant_type=refresh_token&refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": "3600",
            "token_type": "Bearer",
            "refresh_token": "refresh-2",
            "id_token": "id-token-2",
            "user_id": "uid-alice",
            "project_id": "1234"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let kv = Arc::new(KvStore::in_memory().unwrap());
    kv.set_text(AUTH_USER_KEY, r#"{"uid":"uid-alice","refreshToken":"refresh-1"}"#)
        .unwrap();

    // A fresh process: nothing in memory yet
    let tokens = AuthTokens::new();
    let auth = persisting_auth_client(&server, tokens.clone(), kv.clone());

    let uid = auth.restore_session().await.unwrap().unwrap();
    assert_eq!(uid.as_str(), "uid-alice");
    assert_eq!(tokens.current(), Some("id-token-2".to_string()));

    // Rotated refresh token replaces the old one
    let stored: serde_json::Value =
        serde_json::from_str(&kv.get_text(AUTH_USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored["refreshToken"], "refresh-2");
}

#[tokio::test]
async fn test_restore_session_with_revoked_token_forgets_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "TOKEN_EXPIRED", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let kv = Arc::new(KvStore::in_memory().unwrap());
    kv.set_text(AUTH_USER_KEY, r#"{"uid":"uid-alice","refreshToken":"stale"}"#)
        .unwrap();

    let tokens = AuthTokens::new();
    let auth = persisting_auth_client(&server, tokens.clone(), kv.clone());

    let err = auth.restore_session().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::UserTokenExpired);
    assert_eq!(tokens.current(), None);
    assert_eq!(kv.get_text(AUTH_USER_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_restore_session_offline_keeps_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let kv = Arc::new(KvStore::in_memory().unwrap());
    kv.set_text(AUTH_USER_KEY, r#"{"uid":"uid-alice","refreshToken":"refresh-1"}"#)
        .unwrap();

    let client = RestClient::new(
        RestClientConfig::new(server.uri()).with_timeout(Duration::from_millis(100)),
    )
    .unwrap();
    let auth = auth_client(&server, AuthTokens::new()).with_persistence(kv.clone(), client);

    let err = auth.restore_session().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NetworkRequestFailed);
    assert!(kv.get_text(AUTH_USER_KEY).unwrap().is_some());
}

// =============================================================================
// Database
// =============================================================================

#[tokio::test]
async fn test_database_write_carries_auth_token() {
    let server = MockServer::start().await;

    let record = json!({
        "name": "Alice",
        "usermail": "alice@example.com",
        "phoneNumber": "+971501234567",
        "package": "Gold"
    });

    Mock::given(method("PUT"))
        .and(path("/users/uid-alice.json"))
        .and(query_param("auth", "id-token-1"))
        .and(body_json(record.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(record.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = AuthTokens::new();
    tokens.set("id-token-1");
    let db = database_client(&server, tokens);

    db.set("/users/uid-alice", record).await.unwrap();
}

#[tokio::test]
async fn test_database_read_present_and_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/uid-alice.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Alice"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/uid-nobody.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let db = database_client(&server, AuthTokens::new());

    let present = db.get("/users/uid-alice").await.unwrap();
    assert_eq!(present, Some(json!({"name": "Alice"})));

    let absent = db.get("/users/uid-nobody").await.unwrap();
    assert_eq!(absent, None);
}

#[tokio::test]
async fn test_database_permission_denied() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/uid-alice.json"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Permission denied"})),
        )
        .mount(&server)
        .await;

    let db = database_client(&server, AuthTokens::new());
    let err = db.get("/users/uid-alice").await.unwrap_err();

    assert_eq!(err, DatabaseError::PermissionDenied("Permission denied".to_string()));
}

#[tokio::test]
async fn test_database_rejects_bad_path_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let db = database_client(&server, AuthTokens::new());
    let err = db.get("/users/a.b").await.unwrap_err();

    assert!(matches!(err, DatabaseError::InvalidPath(_)));
}
