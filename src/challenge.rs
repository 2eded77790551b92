use crate::{Error, Error::*, Result};
use std::fmt;
use std::str::FromStr;

const WHITESPACE: &[char] = &[' ', '\n', '\r', '\t'];

/// Digest challenge state shared by all requests of one session.
///
/// Server-issued fields are kept as the raw strings from `WWW-Authenticate`;
/// they are only interpreted when a response is computed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Challenge {
    /// Login username
    pub username: String,
    /// Login password (plain), never sent over the wire
    pub password: String,
    /// Authorization realm
    pub realm: String,
    /// Space separated list of URIs protected by the same credentials
    pub domain: String,
    /// Server nonce, replaced on every re-challenge
    pub nonce: String,
    /// Server opaque string, echoed back verbatim
    pub opaque: String,
    /// "true" when the server rejected an expired nonce but accepted the credentials
    pub stale: String,
    /// Hashing algorithm name
    pub algorithm: String,
    /// Quality of protection, "" or "auth"
    pub qop: String,
    /// Client nonce of the last computed response
    pub cnonce: String,
    /// How many responses have been computed so far.
    /// Not part of the received header; incremented by [`Challenge::respond`].
    pub nonce_count: u32,
}

impl Challenge {
    /// Empty challenge carrying only credentials
    pub fn new(username: &str, password: &str) -> Self {
        Challenge {
            username: username.to_owned(),
            password: password.to_owned(),
            ..Default::default()
        }
    }

    /// Overwrite the server-issued fields from a `WWW-Authenticate` value.
    ///
    /// Credentials, `cnonce` and `nonce_count` are left untouched.
    ///
    /// # Errors
    /// If the value does not start with `Digest `, a token has no `=`,
    /// or a key outside realm/domain/nonce/opaque/stale/algorithm/qop is present.
    /// A rejected value leaves `self` unchanged.
    pub fn parse_into(&mut self, input: &str) -> Result<()> {
        let s = input.trim_matches(WHITESPACE);
        let rest = match s.strip_prefix("Digest ") {
            Some(rest) => rest.trim_matches(WHITESPACE),
            None => {
                return Err(MalformedChallenge(format!("missing prefix: {}", input)));
            }
        };

        // validate the whole header before touching any field
        let mut fields = Vec::new();
        for token in rest.split(", ") {
            let (key, value) = match token.split_once('=') {
                Some(kv) => kv,
                None => {
                    return Err(MalformedChallenge(format!("unexpected token: {}", token)));
                }
            };
            match key {
                "realm" | "domain" | "nonce" | "opaque" | "stale" | "algorithm" | "qop" => {
                    fields.push((key, value.trim_matches('"')));
                }
                _ => {
                    return Err(MalformedChallenge(format!("unexpected token: {}", token)));
                }
            }
        }

        self.algorithm = "MD5".to_string();
        for (key, value) in fields {
            let slot = match key {
                "realm" => &mut self.realm,
                "domain" => &mut self.domain,
                "nonce" => &mut self.nonce,
                "opaque" => &mut self.opaque,
                "stale" => &mut self.stale,
                "algorithm" => &mut self.algorithm,
                "qop" => &mut self.qop,
                _ => continue,
            };
            *slot = value.to_string();
        }

        Ok(())
    }

    /// Construct from the `WWW-Authenticate` header string, with empty credentials
    pub fn parse(input: &str) -> Result<Self> {
        let mut challenge = Challenge::default();
        challenge.parse_into(input)?;
        Ok(challenge)
    }

    /// True if the server flagged the nonce as expired
    pub fn is_stale(&self) -> bool {
        self.stale.eq_ignore_ascii_case("true")
    }
}

impl FromStr for Challenge {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}

// Hand-written so the password never ends up in logs
impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Challenge")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .field("domain", &self.domain)
            .field("nonce", &self.nonce)
            .field("opaque", &self.opaque)
            .field("stale", &self.stale)
            .field("algorithm", &self.algorithm)
            .field("qop", &self.qop)
            .field("cnonce", &self.cnonce)
            .field("nonce_count", &self.nonce_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Challenge;
    use crate::Error;
    use std::str::FromStr;

    #[test]
    fn test_parse_all_fields() {
        let src = r#"Digest realm="api@example.org", qop="auth", domain="/api/v2 /login", algorithm=MD5, nonce="5TsQWLVdgBdmrQ0XsxbDODV+57QdFR34I9HAbC/RVvkK", opaque="HRPCssKJSGjCrkzDg8OhwpzCiGPChXYjwrI2QmXDnsOS", stale=FALSE"#;

        let parsed = Challenge::from_str(src).unwrap();

        assert_eq!(
            parsed,
            Challenge {
                realm: "api@example.org".to_string(),
                domain: "/api/v2 /login".to_string(),
                nonce: "5TsQWLVdgBdmrQ0XsxbDODV+57QdFR34I9HAbC/RVvkK".to_string(),
                opaque: "HRPCssKJSGjCrkzDg8OhwpzCiGPChXYjwrI2QmXDnsOS".to_string(),
                stale: "FALSE".to_string(),
                algorithm: "MD5".to_string(),
                qop: "auth".to_string(),
                ..Default::default()
            }
        );
        assert!(!parsed.is_stale());
    }

    #[test]
    fn test_parse_order_independent() {
        let a = Challenge::parse(r#"Digest realm="r", nonce="n", qop="auth""#).unwrap();
        let b = Challenge::parse(r#"Digest qop="auth", nonce="n", realm="r""#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_defaults() {
        // surrounding whitespace is fine, algorithm falls back to MD5
        let parsed = Challenge::parse("\n\t Digest realm=\"aaa\", nonce=\"bbb\"  \r\n").unwrap();
        assert_eq!(parsed.realm, "aaa");
        assert_eq!(parsed.nonce, "bbb");
        assert_eq!(parsed.algorithm, "MD5");
        assert_eq!(parsed.qop, "");
        assert_eq!(parsed.opaque, "");
    }

    #[test]
    fn test_parse_keeps_unsupported_values() {
        // rejected later, when a response is computed
        let parsed = Challenge::parse(r#"Digest realm="r", nonce="n", algorithm=SHA-256"#).unwrap();
        assert_eq!(parsed.algorithm, "SHA-256");
    }

    #[test]
    fn test_parse_errors() {
        for src in [
            r#"Basic realm="aaa""#,
            r#"realm="aaa", nonce="bbb""#,
            r#"Digest realm="aaa", charset=UTF-8"#,
            r#"Digest realm="aaa", userhash=true"#,
            r#"Digest realm="aaa", bogus"#,
            "",
        ] {
            assert!(
                matches!(Challenge::parse(src), Err(Error::MalformedChallenge(_))),
                "{} should be rejected",
                src
            );
        }
    }

    #[test]
    fn test_parse_into_preserves_client_state() {
        let mut challenge = Challenge::new("Mufasa", "Circle Of Life");
        challenge
            .parse_into(r#"Digest realm="r", nonce="first", opaque="o1", algorithm=MD5-sess"#)
            .unwrap();
        challenge.cnonce = "0a4f113b".to_string();
        challenge.nonce_count = 7;

        challenge
            .parse_into(r#"Digest realm="r", nonce="second", stale=true"#)
            .unwrap();

        assert_eq!(challenge.username, "Mufasa");
        assert_eq!(challenge.password, "Circle Of Life");
        assert_eq!(challenge.nonce, "second");
        assert_eq!(challenge.cnonce, "0a4f113b");
        assert_eq!(challenge.nonce_count, 7);
        // reset to the default on every parse
        assert_eq!(challenge.algorithm, "MD5");
        // not mentioned by the new challenge, so kept
        assert_eq!(challenge.opaque, "o1");
        assert!(challenge.is_stale());
    }

    #[test]
    fn test_rejected_parse_leaves_state_alone() {
        let mut challenge = Challenge::new("Mufasa", "Circle Of Life");
        challenge
            .parse_into(r#"Digest realm="r", nonce="first", qop="auth", algorithm=MD5"#)
            .unwrap();
        let before = challenge.clone();

        for src in [
            r#"Digest realm="other", nonce="half", charset=UTF-8"#,
            r#"Digest algorithm=SHA-256, realm="other", bogus"#,
        ] {
            assert!(challenge.parse_into(src).is_err());
            assert_eq!(challenge, before);
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let challenge = Challenge::new("Mufasa", "Circle Of Life");
        let dbg = format!("{:?}", challenge);
        assert!(dbg.contains("Mufasa"));
        assert!(!dbg.contains("Circle Of Life"));
    }
}
