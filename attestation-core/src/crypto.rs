//! Content hashing of canonical transactions.
//!
//! The root is a content-addressing fingerprint used to report agreement, not
//! a security primitive. Both sides of a comparison always go through the same
//! [`ContentHasher`].

use crate::serialization::to_canonical_bytes;
use crate::types::{CanonicalTransaction, Hash256, Root};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Compute SHA-256 hash of data.
pub fn sha256(data: &[u8]) -> Hash256 {
    let hash = Sha256::digest(data);
    hash.into()
}

/// Compute Blake3 hash of data.
pub fn blake3(data: &[u8]) -> Hash256 {
    let hash = blake3::hash(data);
    *hash.as_bytes()
}

/// 256-bit hash function used for content roots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    pub fn hash(&self, data: &[u8]) -> Hash256 {
        match self {
            HashAlgorithm::Sha256 => sha256(data),
            HashAlgorithm::Blake3 => blake3(data),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha256 => write!(f, "sha256"),
            HashAlgorithm::Blake3 => write!(f, "blake3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hash algorithm `{0}` (expected sha256 or blake3)")]
pub struct UnknownHashAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnknownHashAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            _ => Err(UnknownHashAlgorithm(s.to_string())),
        }
    }
}

/// Derives the content root of a canonical transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentHasher {
    algorithm: HashAlgorithm,
}

impl ContentHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash the canonical JSON bytes of `tx`.
    pub fn digest(&self, tx: &CanonicalTransaction) -> Root {
        Root(self.algorithm.hash(&to_canonical_bytes(tx)))
    }
}
