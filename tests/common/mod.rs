#![allow(dead_code)]

use std::collections::HashMap;

use crowbar_api::{Algorithm, ClientConfig, Session};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const USER: &str = "crowbar";
pub const PASSWORD: &str = "crowbar";
pub const REALM: &str = "Crowbar - By selecting OK are agreeing to the License Agreement";
pub const NONCE: &str = "MTQzNjU1NTY0MTo5ZWI5MmU5MTNjYTg5ZTI1YjcxNjEyZGE0ZTVjYTE2Yg==";

pub fn challenge_header(nonce: &str) -> String {
    format!(
        r#"Digest realm="{}", qop="auth", algorithm=MD5, nonce="{}", opaque="a1b2c3""#,
        REALM, nonce
    )
}

pub fn unauthorized(nonce: &str) -> ResponseTemplate {
    ResponseTemplate::new(401).insert_header("WWW-Authenticate", challenge_header(nonce).as_str())
}

/// Answer the bootstrap probe with a challenge
pub async fn mount_probe(server: &MockServer) {
    Mock::given(method("HEAD"))
        .and(path("/api/v2/digest"))
        .respond_with(unauthorized(NONCE))
        .mount(server)
        .await;
}

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(&server.uri(), USER, PASSWORD)
}

pub async fn session(server: &MockServer) -> Session {
    mount_probe(server).await;
    Session::establish(config(server)).await.unwrap()
}

/// Digest parameters of an `Authorization` header, quotes stripped
pub fn digest_params(header: &str) -> HashMap<String, String> {
    header
        .strip_prefix("Digest ")
        .expect("digest header")
        .split(", ")
        .filter_map(|kv| kv.split_once('='))
        .map(|(k, v)| (k.to_string(), v.trim_matches('"').to_string()))
        .collect()
}

pub fn authorization(request: &Request) -> HashMap<String, String> {
    let value = request
        .headers
        .get("authorization")
        .expect("authorization header")
        .to_str()
        .unwrap();
    digest_params(value)
}

/// Server side of the handshake: recomputes the digest and answers with
/// `body` if it matches, or a fresh 401 otherwise.
pub struct DigestCheck {
    pub body: serde_json::Value,
}

impl Respond for DigestCheck {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let params = match request.headers.get("authorization") {
            Some(v) => digest_params(v.to_str().unwrap()),
            None => return unauthorized(NONCE),
        };
        let h = Algorithm::MD5;
        let ha1 = h.hash_str(&format!("{}:{}:{}", USER, REALM, PASSWORD));
        let ha2 = h.hash_str(&format!("{}:{}", request.method.as_str(), params["uri"]));
        let expected = h.hash_str(&format!(
            "{}:{}:{}:{}:{}:{}",
            ha1, params["nonce"], params["nc"], params["cnonce"], params["qop"], ha2
        ));

        if params["response"] == expected && params["uri"] == request.url.path() {
            ResponseTemplate::new(200).set_body_json(self.body.clone())
        } else {
            unauthorized(NONCE)
        }
    }
}
