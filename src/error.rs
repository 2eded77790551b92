use std::result;

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// `WWW-Authenticate` value that does not follow the Digest grammar we accept
    #[error("Challenge is bad: {0}")]
    MalformedChallenge(String),

    /// Algorithm or qop outside MD5 / {"", "auth"}
    #[error("Algorithm not implemented: {0}")]
    UnsupportedAlgorithm(String),

    /// The bootstrap probe was not answered with 401
    #[error("Expected digest challenge on {url}, got {status}")]
    ProtocolMismatch { url: String, status: StatusCode },

    /// The server rejected a freshly re-challenged request
    #[error("Authentication failed for {uri} after re-challenge")]
    AuthenticationFailed { uri: String },

    #[error("Expected status in the 200 range, got {code}: {body}")]
    UnexpectedStatus { code: StatusCode, body: String },

    #[error("Status: {status}, Message: {body}")]
    DecodeError { status: StatusCode, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unable to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Identifier a resource cannot accept
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Resource operation that needs an id on an object without one
    #[error("{0} has no id")]
    MissingId(&'static str),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::ProtocolMismatch { status, .. } => Some(*status),
            Error::AuthenticationFailed { .. } => Some(StatusCode::UNAUTHORIZED),
            Error::UnexpectedStatus { code, .. } => Some(*code),
            Error::DecodeError { status, .. } => Some(*status),
            Error::Transport(e) => e.status(),
            _ => None,
        }
    }
}
