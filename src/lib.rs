//! Client for JSON REST APIs protected by HTTP Digest authentication (RFC 2617),
//! as served by Crowbar.
//!
//! A [`Session`] is bootstrapped with a single probe request that the server
//! answers with a `401` and a `WWW-Authenticate: Digest ...` challenge. Every
//! later request carries an `Authorization` header computed from that
//! challenge; when the server re-challenges (e.g. its nonce went stale) the
//! session picks up the new challenge and retries the request once.
//!
//! Only `algorithm=MD5` with `qop` absent or `auth` is implemented.
//!
//! # Examples
//!
//! The digest machinery can be used on its own:
//!
//! ```
//! use crowbar_api::{AuthorizationHeader, Challenge};
//!
//! // Value from the WWW-Authenticate HTTP header (usually in a HTTP 401 response)
//! let www_authenticate = r#"Digest realm="testrealm@host.com", qop="auth", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;
//!
//! let mut challenge = Challenge::new("Mufasa", "Circle Of Life");
//! challenge.parse_into(www_authenticate).unwrap();
//!
//! // For this test, we inject a custom cnonce. It's generated for you otherwise.
//! let answer = AuthorizationHeader::from_challenge(&mut challenge, "GET", "/dir/index.html", Some("0a4f113b"))
//!     .unwrap()
//!     .to_string();
//! assert_eq!(answer, r#"Digest username="Mufasa", realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", uri="/dir/index.html", response="6629fae49393a05397450978507c4ef1", algorithm="MD5", opaque="5ccc069c403ebaf9f0171e9517f40e41", qop=auth, nc=00000001, cnonce="0a4f113b""#);
//!
//! // The nonce count lives in the challenge and is bumped on every response,
//! // so the next header for the same request differs.
//! let answer2 = AuthorizationHeader::from_challenge(&mut challenge, "GET", "/dir/index.html", Some("0a4f113b"))
//!     .unwrap();
//! assert_eq!(answer2.get("nc"), Some("00000002"));
//! ```
//!
//! Talking to a server:
//!
//! ```no_run
//! use crowbar_api::{ClientConfig, Session};
//! use serde_json::Value;
//!
//! # async fn run() -> crowbar_api::Result<()> {
//! let session = Session::establish(ClientConfig::new("http://127.0.0.1:3000", "crowbar", "crowbar")).await?;
//!
//! let nodes: Value = session.fetch("nodes").await?;
//! let mut node = serde_json::json!({ "name": "d52-54-00-01-02-03.example.com" });
//! session.post(&mut node, "nodes").await?;
//! // `node` now holds the server's copy, including its id
//! # Ok(())
//! # }
//! ```

mod authorization;
mod challenge;
mod config;
mod digest;
mod dispatch;
mod enums;
mod error;
mod resource;
mod session;
mod utils;

pub use error::{Error, Result};

pub use crate::authorization::{authorize, AuthorizationHeader};
pub use crate::challenge::Challenge;
pub use crate::config::{parse_key, ClientConfig, DEFAULT_API_PATH, DEFAULT_ENDPOINT, ENDPOINT_ENV, KEY_ENV};
pub use crate::dispatch::{RawResponse, MAX_REAUTH};
pub use crate::resource::Resource;
pub use crate::session::{establish_session, Session, PROBE_PATH};

pub use crate::enums::*;

/// Parse a `WWW-Authenticate` header value into a challenge without credentials.
/// It's just a convenience method to call [`Challenge::parse()`](struct.Challenge.html#method.parse).
pub fn parse(www_authenticate: &str) -> Result<Challenge> {
    Challenge::parse(www_authenticate)
}

#[test]
fn test_parse_respond() {
    let src = r#"
    Digest realm="http-auth@example.org", qop="auth", algorithm=MD5, nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v", opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS"
    "#;

    let mut prompt = crate::parse(src).unwrap();
    prompt.username = "Mufasa".to_string();
    prompt.password = "Circle of Life".to_string();

    let answer = AuthorizationHeader::from_challenge(
        &mut prompt,
        "GET",
        "/dir/index.html",
        Some("f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ"),
    )
    .unwrap();

    let str = answer.to_string().replace(", ", ",\n  ");

    // RFC 7616 section 3.9.1 MD5 example
    assert_eq!(
        str,
        r#"
Digest username="Mufasa",
  realm="http-auth@example.org",
  nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
  uri="/dir/index.html",
  response="8ca523f5e9506fed4657c9700eebdbec",
  algorithm="MD5",
  opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS",
  qop=auth,
  nc=00000001,
  cnonce="f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ"
"#
        .trim()
    );
}
