use crate::challenge::Challenge;
use crate::utils::QuoteForDigest;
use crate::Result;
use std::fmt::{self, Display, Formatter};

/// Value of the `Authorization` header sent back to the server.
///
/// Fields are kept in insertion order, which is the order they are rendered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationHeader {
    fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    key: &'static str,
    value: String,
    quoted: bool,
}

impl AuthorizationHeader {
    /// Compute a response for `method` and `uri` and build the header from it.
    ///
    /// Increments the challenge's nonce count (see [`Challenge::respond`]).
    /// `cnonce` overrides the generated client nonce, which is only useful for tests.
    pub fn from_challenge(
        challenge: &mut Challenge,
        method: &str,
        uri: &str,
        cnonce: Option<&str>,
    ) -> Result<Self> {
        let response = challenge.respond(method, uri, cnonce)?;

        let mut hdr = AuthorizationHeader::default()
            .quoted("username", &challenge.username)
            .quoted("realm", &challenge.realm)
            .quoted("nonce", &challenge.nonce)
            .quoted("uri", uri)
            .quoted("response", &response);

        if !challenge.algorithm.is_empty() {
            hdr = hdr.quoted("algorithm", &challenge.algorithm);
        }
        if !challenge.opaque.is_empty() {
            hdr = hdr.quoted("opaque", &challenge.opaque);
        }
        if !challenge.qop.is_empty() {
            hdr = hdr
                .plain("qop", &challenge.qop)
                .plain("nc", &format!("{:08x}", challenge.nonce_count))
                .quoted("cnonce", &challenge.cnonce);
        }

        Ok(hdr)
    }

    /// Append `key="value"`
    pub fn quoted(mut self, key: &'static str, value: &str) -> Self {
        self.fields.push(Field {
            key,
            value: value.to_owned(),
            quoted: true,
        });
        self
    }

    /// Append `key=value`
    pub fn plain(mut self, key: &'static str, value: &str) -> Self {
        self.fields.push(Field {
            key,
            value: value.to_owned(),
            quoted: false,
        });
        self
    }

    /// Look up a field value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    /// Produce a header string (also accessible through the Display trait)
    pub fn to_header_string(&self) -> String {
        self.to_string()
    }
}

impl Display for AuthorizationHeader {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("Digest ")?;

        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if field.quoted {
                write!(f, "{}=\"{}\"", field.key, field.value.quote_for_digest())?;
            } else {
                write!(f, "{}={}", field.key, field.value)?;
            }
        }

        Ok(())
    }
}

/// Compute the `Authorization` header value for one request against `challenge`
pub fn authorize(challenge: &mut Challenge, method: &str, uri: &str) -> Result<String> {
    Ok(AuthorizationHeader::from_challenge(challenge, method, uri, None)?.to_header_string())
}
