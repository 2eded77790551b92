use crate::{Error, Error::*, Result};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use digest::Digest;
use md5::Md5;

/// Hash algorithm named by the `algorithm` challenge field.
///
/// Only plain MD5 is implemented; `MD5-sess` and the RFC 7616 SHA variants
/// are rejected when parsed.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum Algorithm {
    #[default]
    MD5,
}

impl Algorithm {
    /// Calculate a hash of bytes, rendered as lowercase hex
    pub fn hash(self, bytes: &[u8]) -> String {
        match self {
            Algorithm::MD5 => hex::encode(Md5::digest(bytes)),
        }
    }

    /// Calculate a hash of string's bytes
    pub fn hash_str(self, s: &str) -> String {
        self.hash(s.as_bytes())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MD5" => Ok(Algorithm::MD5),
            _ => Err(UnsupportedAlgorithm(format!("algorithm={}", s))),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Algorithm::MD5 => "MD5",
        })
    }
}

/// QOP field values we know how to answer
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
pub enum Qop {
    /// No qop offered (RFC 2069 compatible response)
    NONE,
    AUTH,
}

impl FromStr for Qop {
    type Err = Error;

    /// Parse from "" or "auth"; "auth-int" and anything else is unsupported
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(Qop::NONE),
            "auth" => Ok(Qop::AUTH),
            _ => Err(UnsupportedAlgorithm(format!("qop={}", s))),
        }
    }
}

impl Display for Qop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Qop::NONE => "",
            Qop::AUTH => "auth",
        })
    }
}
