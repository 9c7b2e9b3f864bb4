//! # Bounded ASCII Fields
//!
//! Length-bounded, ASCII-only string newtypes for every free-form value the
//! registry stores.
//!
//! | Type | Bound (bytes) |
//! |------|---------------|
//! | [`Did`](crate::Did) | 100 |
//! | [`Metadata`] | 500 |
//! | [`CredentialId`] | 100 |
//! | [`CredentialType`] | 50 |
//! | [`CredentialData`] | 1000 |
//!
//! ## Alphabet
//!
//! Printable ASCII (`0x20..=0x7E`) plus tab, line feed, and carriage return.
//! Other control characters and any non-ASCII code point are rejected.
//! Empty strings are accepted; no field carries a minimum length.
//!
//! ## Serde
//!
//! All types deserialize through `TryFrom<String>`, so an oversize value in a
//! JSON body or a snapshot file fails at parse time with the same
//! [`ValidationError`] a direct constructor call would return.

use crate::error::ValidationError;

/// Validate a bounded ASCII field.
///
/// The length check runs first so that a 10 MB body is rejected without
/// scanning it.
pub(crate) fn validate_ascii(field: &'static str, s: &str, max: usize) -> Result<(), ValidationError> {
    if s.len() > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: s.len(),
        });
    }
    for (position, c) in s.char_indices() {
        let allowed = matches!(c, ' '..='~' | '\t' | '\n' | '\r');
        if !allowed {
            return Err(ValidationError::InvalidCharacter {
                field,
                found: c,
                position,
            });
        }
    }
    Ok(())
}

/// Declare a bounded ASCII newtype with validated construction and serde.
macro_rules! bounded_ascii {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length in bytes.
            pub const MAX_LEN: usize = $max;

            /// Create a value, validating length and alphabet.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::TooLong`] or
            /// [`ValidationError::InvalidCharacter`].
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::ValidationError> {
                let s = value.into();
                $crate::fields::validate_ascii($field, &s, Self::MAX_LEN)?;
                Ok(Self(s))
            }

            /// Access the string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Length in bytes.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the value is the empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $crate::ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub(crate) use bounded_ascii;

bounded_ascii!(
    /// Mutable free-form metadata attached to an identity.
    Metadata,
    "metadata",
    500
);

bounded_ascii!(
    /// Credential identifier, unique per subject.
    ///
    /// The same identifier may be reused across different subjects.
    CredentialId,
    "credential_id",
    100
);

bounded_ascii!(
    /// Free-form credential category tag (e.g., `"kyc"`).
    CredentialType,
    "credential_type",
    50
);

bounded_ascii!(
    /// Opaque credential payload.
    CredentialData,
    "credential_data",
    1000
);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_value_at_bound() {
        let s = "a".repeat(CredentialType::MAX_LEN);
        let v = CredentialType::new(s.clone()).unwrap();
        assert_eq!(v.as_str(), s);
        assert_eq!(v.len(), 50);
    }

    #[test]
    fn rejects_value_one_past_bound() {
        let s = "a".repeat(CredentialType::MAX_LEN + 1);
        let err = CredentialType::new(s).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "credential_type",
                max: 50,
                actual: 51,
            }
        );
    }

    #[test]
    fn empty_is_allowed() {
        let m = Metadata::new("").unwrap();
        assert!(m.is_empty());
        assert_eq!(m, Metadata::default());
    }

    #[test]
    fn rejects_non_ascii() {
        let err = CredentialData::new("caf\u{e9}").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCharacter {
                field: "credential_data",
                found: '\u{e9}',
                position: 3,
            }
        ));
    }

    #[test]
    fn rejects_control_characters() {
        assert!(Metadata::new("a\u{0}b").is_err());
        assert!(Metadata::new("bell\u{7}").is_err());
        assert!(Metadata::new("del\u{7f}").is_err());
    }

    #[test]
    fn accepts_whitespace_controls() {
        assert!(Metadata::new("line one\nline two\tcol\r\n").is_ok());
    }

    #[test]
    fn length_is_checked_before_alphabet() {
        let s = "\u{e9}".repeat(60);
        let err = CredentialType::new(s).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { .. }));
    }

    #[test]
    fn serde_rejects_oversize_json() {
        let json = format!("\"{}\"", "x".repeat(101));
        let parsed: Result<CredentialId, _> = serde_json::from_str(&json);
        assert!(parsed.is_err());
    }

    #[test]
    fn serde_is_transparent_string() {
        let id = CredentialId::new("cred1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"cred1\"");
        let parsed: CredentialId = serde_json::from_str("\"cred1\"").unwrap();
        assert_eq!(parsed, id);
    }

    proptest! {
        #[test]
        fn printable_ascii_within_bound_always_accepted(s in "[ -~]{0,1000}") {
            prop_assert!(CredentialData::new(s).is_ok());
        }

        #[test]
        fn anything_over_bound_always_rejected(s in "[ -~]{501,700}") {
            let rejected = matches!(
                Metadata::new(s),
                Err(ValidationError::TooLong { max: 500, .. })
            );
            prop_assert!(rejected);
        }
    }
}
