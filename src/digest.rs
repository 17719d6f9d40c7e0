//! Content Digests
//!
//! Digest strings in `<algorithm>:<hex>` form as used throughout the OCI
//! wire formats:
//! - Strict format validation on parse (sha256, sha512)
//! - sha256 computation over raw content
//! - String-form serde codec
//!
//! Comparing content against an expected digest belongs to the transfer
//! code that fetches blobs, not here.

use crate::{RegistryError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// A content digest (e.g., "sha256:e3b0c442...")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    /// Parse and validate a digest string
    pub fn parse(s: &str) -> Result<Self> {
        let (algorithm, encoded) = s.split_once(':').ok_or_else(|| {
            RegistryError::InvalidDigest(format!("Missing algorithm separator: {}", s))
        })?;

        let expected_len = match algorithm {
            "sha256" => 64,
            "sha512" => 128,
            other => {
                return Err(RegistryError::InvalidDigest(format!(
                    "Unsupported algorithm: {}",
                    other
                )))
            }
        };

        if encoded.len() != expected_len {
            return Err(RegistryError::InvalidDigest(format!(
                "Expected {} hex characters for {}, got {}",
                expected_len,
                algorithm,
                encoded.len()
            )));
        }

        // Registries emit lowercase hex only
        if !encoded.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(RegistryError::InvalidDigest(format!(
                "Non-hex characters in digest: {}",
                s
            )));
        }

        Ok(Self(s.to_string()))
    }

    /// Compute the sha256 digest of raw content
    pub fn from_data(data: &[u8]) -> Self {
        Self(format!("sha256:{:x}", Sha256::digest(data)))
    }

    /// Algorithm component (e.g., "sha256")
    pub fn algorithm(&self) -> &str {
        match self.0.split_once(':') {
            Some((algorithm, _)) => algorithm,
            None => "",
        }
    }

    /// Hex component
    pub fn encoded(&self) -> &str {
        match self.0.split_once(':') {
            Some((_, encoded)) => encoded,
            None => &self.0,
        }
    }

    /// The full digest string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Digest {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::parse(&s).map_err(serde::de::Error::custom)
    }
}
