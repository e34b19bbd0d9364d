//! REST client for the hosted auth and database services
//!
//! Provides request/response types, error parsing and the shared HTTP client.
//! There is no retry logic here: every failure is returned to the caller.

use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// =============================================================================
// Error Types
// =============================================================================

/// REST error with HTTP status, provider error code and message
///
/// A status of `0` means no response was received (connection failure,
/// timeout, unreadable body).
///
/// # Examples
/// ```
/// use firebase_client::rest::RestError;
///
/// let error = RestError::new(400, "EMAIL_EXISTS", "EMAIL_EXISTS");
/// assert_eq!(error.status(), 400);
/// assert!(!error.is_network_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestError {
    status: u16,
    code: String,
    message: String,
}

impl RestError {
    /// Create a new REST error
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an error for a request that never got a response
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(0, "NetworkError", message)
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the provider error code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check whether the request failed before a response arrived
    pub fn is_network_error(&self) -> bool {
        self.status == 0 && self.code == "NetworkError"
    }

    /// Check whether the service refused the caller's credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

impl std::fmt::Display for RestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for RestError {}

/// Error bodies returned by the services.
///
/// The auth service nests a code and message; the database returns a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Structured { error: ErrorDetail },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method for REST requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request (point reads)
    Get,
    /// POST request (auth operations)
    Post,
    /// PUT request (point writes)
    Put,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// REST request with method, path, query parameters, headers and optional body
#[derive(Debug, Clone)]
pub struct RestRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    /// Query parameters
    pub params: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
}

impl RestRequest {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Create a PUT request
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }


    /// Set the request body from JSON
    pub fn json_body<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Set a URL-encoded form body
    pub fn form_body(mut self, fields: &[(&str, &str)]) -> Self {
        let body = fields
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        self.body = Some(body.into_bytes());
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// REST response with status and decoded data
#[derive(Debug, Clone)]
pub struct RestResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response data
    pub data: T,
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for a REST client
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://identitytoolkit.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Member-App/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RestClientConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Client Implementation
// =============================================================================

/// HTTP client shared by the auth and database adapters
#[derive(Debug, Clone)]
pub struct RestClient {
    client: ReqwestClient,
    config: RestClientConfig,
}

impl RestClient {
    /// Create a new REST client
    pub fn new(config: RestClientConfig) -> Result<Self, RestError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RestError::new(0, "ClientBuild", e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Send a request and decode the JSON response body
    pub async fn send<T>(&self, request: RestRequest) -> Result<RestResponse<T>, RestError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
        };

        if !request.params.is_empty() {
            req = req.query(&request.params);
        }

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");

        let response = req
            .send()
            .await
            .map_err(|e| RestError::network(format!("Request failed: {}", e)))?;

        self.parse_response(response).await
    }

    async fn parse_response<T>(&self, response: ReqwestResponse) -> Result<RestResponse<T>, RestError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|e| RestError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody::Structured { error }) => {
                    RestError::new(status.as_u16(), error.message.clone(), error.message)
                }
                Ok(ErrorBody::Plain { error }) => RestError::new(status.as_u16(), "Error", error),
                Err(_) => RestError::new(
                    status.as_u16(),
                    "Unknown",
                    format!("HTTP {}: {}", status.as_u16(), body),
                ),
            });
        }

        let data: T = serde_json::from_str(&body).map_err(|e| {
            RestError::new(status.as_u16(), "ParseError", format!("Failed to parse JSON: {}", e))
        })?;

        Ok(RestResponse { status: status.as_u16(), data })
    }
}
