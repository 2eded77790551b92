//! Client configuration.
//!
//! ```
//! use crowbar_api::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::default()
//!     .with_endpoint("http://crowbar.example:3000")
//!     .with_credentials("crowbar", "crowbar")
//!     .with_request_timeout(Duration::from_secs(30));
//! assert_eq!(config.api_path, "/api/v2");
//! ```

use crate::{Error, Result};
use std::env;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Environment variable holding the API endpoint
pub const ENDPOINT_ENV: &str = "CROWBAR_ENDPOINT";
/// Environment variable holding `username:password`
pub const KEY_ENV: &str = "CROWBAR_KEY";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";
/// Prefix prepended to every request path
pub const DEFAULT_API_PATH: &str = "/api/v2";

/// Connection settings for a [`Session`](crate::Session)
#[derive(Clone)]
pub struct ClientConfig {
    /// Scheme, host and port of the API server
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Path prefix of the API, also used to locate the bootstrap probe
    pub api_path: String,
    /// Sent as `User-Agent` on every request
    pub user_agent: String,
    /// Deadline for one HTTP exchange; `None` waits forever
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: String::new(),
            password: String::new(),
            api_path: DEFAULT_API_PATH.to_string(),
            user_agent: concat!("crowbar-api/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: &str, username: &str, password: &str) -> Self {
        Self::default()
            .with_endpoint(endpoint)
            .with_credentials(username, password)
    }

    /// Defaults overridden by `CROWBAR_ENDPOINT` and `CROWBAR_KEY`, when set
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(endpoint) = env::var(ENDPOINT_ENV) {
            if !endpoint.is_empty() {
                config.endpoint = endpoint;
            }
        }
        if let Ok(key) = env::var(KEY_ENV) {
            if !key.is_empty() {
                let (username, password) = parse_key(&key)?;
                config.username = username.to_string();
                config.password = password.to_string();
            }
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    #[must_use]
    pub fn with_api_path(mut self, api_path: &str) -> Self {
        self.api_path = api_path.to_string();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Parsed endpoint; only http and https are accepted
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::InvalidEndpoint(format!(
                "{}: unsupported scheme {}",
                self.endpoint, other
            ))),
        }
    }

    /// Endpoint without a trailing slash, ready to have an absolute path appended
    pub(crate) fn base_url(&self) -> Result<String> {
        let url = self.endpoint_url()?;
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_path", &self.api_path)
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Split a `username:password` pair; both halves must be non-empty
pub fn parse_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once(':') {
        None => Err(Error::InvalidCredentials(format!(
            "{} does not contain a username:password pair",
            KEY_ENV
        ))),
        Some((user, pass)) if user.is_empty() || pass.is_empty() => Err(
            Error::InvalidCredentials(format!("{} contains an invalid username:password pair", KEY_ENV)),
        ),
        Some(pair) => Ok(pair),
    }
}
