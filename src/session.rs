use crate::challenge::Challenge;
use crate::config::ClientConfig;
use crate::utils::join_path;
use crate::{Error, Result};

use http::header::{USER_AGENT, WWW_AUTHENTICATE};
use http::{HeaderMap, StatusCode};
use tokio::sync::Mutex;
use url::Url;

/// Well-known sub-path of the API that always answers with a digest challenge
pub const PROBE_PATH: &str = "digest";

/// An authenticated connection to one API server.
///
/// The session owns the digest [`Challenge`] behind an async mutex; every
/// request holds it from header computation until its response has been read,
/// so nonce counts are never reused. Share it between tasks with an `Arc`.
#[derive(Debug)]
pub struct Session {
    pub(crate) client: reqwest::Client,
    pub(crate) config: ClientConfig,
    pub(crate) base_url: String,
    pub(crate) challenge: Mutex<Challenge>,
}

impl Session {
    /// Probe the server for a digest challenge and bind it to the configured credentials.
    ///
    /// # Errors
    /// `ProtocolMismatch` unless the probe is answered with exactly 401,
    /// `MalformedChallenge` if its `WWW-Authenticate` header is missing or bad,
    /// `Transport` if the server cannot be reached. Nothing is retried.
    pub async fn establish(config: ClientConfig) -> Result<Self> {
        Self::establish_with_client(reqwest::Client::new(), config).await
    }

    /// Like [`establish`](Session::establish), but reusing a caller-built client
    pub async fn establish_with_client(client: reqwest::Client, config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let probe_url = format!("{}{}", base_url, join_path(&config.api_path, PROBE_PATH));

        tracing::debug!(url = %probe_url, "probing for digest challenge");

        let mut req = client
            .head(&probe_url)
            .header(USER_AGENT, &config.user_agent);
        if let Some(timeout) = config.request_timeout {
            req = req.timeout(timeout);
        }
        let resp = req.send().await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return Err(Error::ProtocolMismatch {
                url: probe_url,
                status: resp.status(),
            });
        }

        let mut challenge = Challenge::new(&config.username, &config.password);
        challenge.parse_into(www_authenticate(resp.headers())?)?;

        tracing::debug!(
            realm = %challenge.realm,
            qop = %challenge.qop,
            algorithm = %challenge.algorithm,
            "session established"
        );

        Ok(Session {
            client,
            config,
            base_url,
            challenge: Mutex::new(challenge),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Endpoint the session talks to, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Copy of the current challenge state
    pub async fn challenge(&self) -> Challenge {
        self.challenge.lock().await.clone()
    }

    /// Absolute request path for `path`, relative to the API prefix
    pub fn api_uri(&self, path: &str) -> String {
        join_path(&self.config.api_path, path)
    }

    /// Full URL for `path` as it will go out on the wire, percent-encoded and
    /// with dot segments resolved
    pub(crate) fn request_url(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, self.api_uri(path));
        Url::parse(&raw).map_err(|e| Error::InvalidEndpoint(format!("{}: {}", raw, e)))
    }
}

/// Request-URI of `url`, the value the digest `uri` field must repeat
pub(crate) fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Shorthand for [`Session::establish`] with default settings
pub async fn establish_session(url: &str, username: &str, password: &str) -> Result<Session> {
    Session::establish(ClientConfig::new(url, username, password)).await
}

pub(crate) fn www_authenticate(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(WWW_AUTHENTICATE)
        .ok_or_else(|| Error::MalformedChallenge("missing WWW-Authenticate header".into()))?;
    value
        .to_str()
        .map_err(|_| Error::MalformedChallenge("WWW-Authenticate is not valid ASCII".into()))
}
