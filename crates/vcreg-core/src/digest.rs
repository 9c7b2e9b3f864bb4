//! # Content Digests
//!
//! Defines [`ContentDigest`] and [`DigestAlgorithm`] for snapshot integrity.
//! Every digest carries its algorithm tag so that a stored digest can always
//! be re-verified with the function that produced it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The hash algorithm used to compute a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

/// A content digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// Lowercase hex of the 32-byte digest value.
    pub hex: String,
}

impl ContentDigest {
    /// Create a SHA-256 content digest from raw bytes.
    pub fn sha256(bytes: [u8; 32]) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            hex: bytes.iter().map(|b| format!("{b:02x}")).collect(),
        }
    }

    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> &str {
        &self.hex
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.algorithm, self.hex)
    }
}

/// Compute the SHA-256 digest of `data`.
pub fn sha256_digest(data: &[u8]) -> ContentDigest {
    let out = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&out);
    ContentDigest::sha256(bytes)
}
