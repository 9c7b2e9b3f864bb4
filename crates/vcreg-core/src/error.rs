//! # Validation Errors
//!
//! Every boundary check in `vcreg-core` reports through [`ValidationError`].
//! The variants name the offending field so that hosts (HTTP, CLI) can
//! surface precise messages without re-deriving which bound was violated.

use thiserror::Error;

/// A value was rejected before it could reach the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Principal string was empty.
    #[error("principal must be non-empty")]
    EmptyPrincipal,

    /// A field exceeded its declared byte bound.
    #[error("{field} exceeds {max} bytes (got {actual})")]
    TooLong {
        /// Name of the field being validated.
        field: &'static str,
        /// Maximum permitted length in bytes.
        max: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A field contained a character outside its permitted alphabet.
    #[error("{field} contains disallowed character {found:?} at byte {position}")]
    InvalidCharacter {
        /// Name of the field being validated.
        field: &'static str,
        /// The rejected character.
        found: char,
        /// Byte offset of the rejected character.
        position: usize,
    },

    /// Public key was not exactly 33 bytes.
    #[error("public key must be {expected} bytes (got {actual})")]
    InvalidKeyLength {
        /// Required key length.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Hex input could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}
