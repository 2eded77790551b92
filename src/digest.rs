use crate::challenge::Challenge;
use crate::enums::{Algorithm, Qop};
use crate::Result;

use rand::Rng;

/// Length of a generated client nonce, in hex characters
const CNONCE_LEN: usize = 16;

impl Challenge {
    /// `H(username:realm:password)`
    pub fn ha1(&self, algorithm: Algorithm) -> String {
        algorithm.hash_str(&format!(
            "{name}:{realm}:{pw}",
            name = self.username,
            realm = self.realm,
            pw = self.password
        ))
    }

    /// `H(method:uri)`
    pub fn ha2(&self, algorithm: Algorithm, method: &str, uri: &str) -> String {
        algorithm.hash_str(&format!("{method}:{uri}", method = method, uri = uri))
    }

    /// Compute the `response` digest for one request.
    ///
    /// [`nonce_count`](Challenge::nonce_count) is incremented before anything is
    /// checked, so even a rejected call consumes a count. With `qop=auth` the
    /// [`cnonce`](Challenge::cnonce) field is replaced by `cnonce` if given and
    /// non-empty, otherwise by a fresh random value.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` if the algorithm is not MD5 or qop is neither "" nor "auth".
    pub fn respond(&mut self, method: &str, uri: &str, cnonce: Option<&str>) -> Result<String> {
        self.nonce_count += 1;

        let h: Algorithm = self.algorithm.parse()?;
        let qop: Qop = self.qop.parse()?;

        let ha1 = self.ha1(h);
        let ha2 = self.ha2(h, method, uri);

        let response = match qop {
            Qop::AUTH => {
                self.cnonce = match cnonce {
                    Some(c) if !c.is_empty() => c.to_owned(),
                    _ => generate_cnonce(),
                };
                let tmp = format!(
                    "{ha1}:{nonce}:{nc:08x}:{cnonce}:{qop}:{ha2}",
                    ha1 = ha1,
                    nonce = self.nonce,
                    nc = self.nonce_count,
                    cnonce = self.cnonce,
                    qop = qop,
                    ha2 = ha2
                );
                h.hash_str(&tmp)
            }
            Qop::NONE => {
                let tmp = format!(
                    "{ha1}:{nonce}:{ha2}",
                    ha1 = ha1,
                    nonce = self.nonce,
                    ha2 = ha2
                );
                h.hash_str(&tmp)
            }
        };

        Ok(response)
    }
}

fn generate_cnonce() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    let mut cnonce = hex::encode(bytes);
    cnonce.truncate(CNONCE_LEN);
    cnonce
}
