//! # Identity Primitives
//!
//! [`Principal`] is the caller address that keys identities and authorizes
//! every mutation. [`Did`] and [`PublicKey`] are the two immutable halves of
//! an identity record.
//!
//! ## Security Invariant
//!
//! A principal is compared byte-for-byte. It carries no whitespace and no
//! control characters, so two principals that render identically are equal.
//! The registry never interprets a DID or a public key; both are stored as
//! supplied, subject only to their length bounds.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::fields::bounded_ascii;

/// Length of a compressed elliptic-curve public key.
pub const PUBLIC_KEY_LEN: usize = 33;

/// Maximum principal length in bytes.
const PRINCIPAL_MAX_LEN: usize = 150;

// ─── Principal ───────────────────────────────────────────────────────

/// A unique caller address serving as identity key and authorization token.
///
/// 1 to 150 bytes of printable, non-whitespace ASCII.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a principal, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPrincipal`], [`ValidationError::TooLong`],
    /// or [`ValidationError::InvalidCharacter`] for whitespace, control, or
    /// non-ASCII characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyPrincipal);
        }
        if s.len() > PRINCIPAL_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "principal",
                max: PRINCIPAL_MAX_LEN,
                actual: s.len(),
            });
        }
        if let Some((position, found)) = s.char_indices().find(|(_, c)| !c.is_ascii_graphic()) {
            return Err(ValidationError::InvalidCharacter {
                field: "principal",
                found,
                position,
            });
        }
        Ok(Self(s))
    }

    /// Access the principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Principal {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Principal {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for Principal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> String {
        value.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── DID ─────────────────────────────────────────────────────────────

bounded_ascii!(
    /// Decentralized Identifier string.
    ///
    /// Caller-supplied and opaque: neither the `did:method:id` syntax nor
    /// uniqueness across identities is checked. Only the 100-byte bound and
    /// the ASCII alphabet apply.
    Did,
    "did",
    100
);

// ─── Public Key ──────────────────────────────────────────────────────

/// A 33-byte compressed public key, opaque to the registry.
///
/// Serializes as 66 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a key from a slice, rejecting any length other than 33.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; PUBLIC_KEY_LEN] =
            bytes
                .try_into()
                .map_err(|_| ValidationError::InvalidKeyLength {
                    expected: PUBLIC_KEY_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// Parse a key from a hex string (optionally `0x`-prefixed).
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex_decode(s)?;
        Self::from_slice(&bytes)
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for PublicKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<PublicKey> for String {
    fn from(value: PublicKey) -> String {
        value.to_hex()
    }
}

/// Decode a hex string into bytes.
fn hex_decode(s: &str) -> Result<Vec<u8>, ValidationError> {
    if s.len() % 2 != 0 {
        return Err(ValidationError::InvalidHex(format!(
            "odd length: {}",
            s.len()
        )));
    }
    if !s.is_ascii() {
        return Err(ValidationError::InvalidHex("non-ASCII input".to_string()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|e| ValidationError::InvalidHex(format!("position {i}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Principal ────────────────────────────────────────────────────

    #[test]
    fn principal_accepts_stacks_style_address() {
        let p = Principal::new("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7").unwrap();
        assert_eq!(p.as_str(), "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7");
    }

    #[test]
    fn principal_accepts_contract_principal() {
        assert!(Principal::new("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.identity-registry").is_ok());
    }

    #[test]
    fn principal_rejects_empty() {
        assert_eq!(Principal::new(""), Err(ValidationError::EmptyPrincipal));
    }

    #[test]
    fn principal_rejects_whitespace() {
        let err = Principal::new("alice bob").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCharacter { found: ' ', position: 5, .. }
        ));
    }

    #[test]
    fn principal_rejects_overlong() {
        assert!(Principal::new("a".repeat(151)).is_err());
        assert!(Principal::new("a".repeat(150)).is_ok());
    }

    #[test]
    fn principal_parses_via_from_str() {
        let p: Principal = "alice".parse().unwrap();
        assert_eq!(p.to_string(), "alice");
    }

    // ── DID ──────────────────────────────────────────────────────────

    #[test]
    fn did_format_is_not_validated() {
        assert!(Did::new("not-a-did-at-all").is_ok());
        assert!(Did::new("").is_ok());
    }

    #[test]
    fn did_bound_is_100_bytes() {
        assert!(Did::new(format!("did:ex:{}", "a".repeat(93))).is_ok());
        assert!(Did::new(format!("did:ex:{}", "a".repeat(94))).is_err());
    }

    // ── Public key ───────────────────────────────────────────────────

    #[test]
    fn public_key_hex_roundtrip() {
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes[0] = 0x02;
        bytes[32] = 0xff;
        let key = PublicKey::from_bytes(bytes);
        let hex = key.to_hex();
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("02"));
        assert!(hex.ends_with("ff"));
        assert_eq!(PublicKey::from_hex(&hex).unwrap(), key);
    }

    #[test]
    fn public_key_accepts_0x_prefix() {
        let hex = format!("0x{}", "00".repeat(33));
        assert_eq!(
            PublicKey::from_hex(&hex).unwrap(),
            PublicKey::from_bytes([0u8; 33])
        );
    }

    #[test]
    fn public_key_rejects_wrong_length() {
        let err = PublicKey::from_hex(&"00".repeat(32)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidKeyLength {
                expected: 33,
                actual: 32,
            }
        );
    }

    #[test]
    fn public_key_rejects_bad_hex() {
        assert!(matches!(
            PublicKey::from_hex("zz"),
            Err(ValidationError::InvalidHex(_))
        ));
        assert!(matches!(
            PublicKey::from_hex("abc"),
            Err(ValidationError::InvalidHex(_))
        ));
    }

    #[test]
    fn public_key_serde_as_hex_string() {
        let key = PublicKey::from_bytes([0x03; 33]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", "03".repeat(33)));
        let parsed: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }
}
