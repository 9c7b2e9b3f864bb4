//! # Registry Errors
//!
//! Six failure kinds, returned as typed values. Each kind maps to exactly
//! one precondition so callers can tell which check rejected them.

use thiserror::Error;

/// A rejected registry operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryError {
    /// Caller lacks the required privilege: a non-owner toggling pause, or a
    /// non-issuer revoking a credential.
    #[error("caller is not authorized for this operation")]
    NotAuthorized,

    /// Registration attempted for a principal that already has an identity.
    #[error("identity already exists for caller")]
    IdentityExists,

    /// Metadata update or credential issuance targets a principal with no identity.
    #[error("identity not found")]
    IdentityNotFound,

    /// Issuance targets a (subject, credential id) pair that already exists.
    #[error("credential already exists for subject")]
    CredentialExists,

    /// Revocation targets a (subject, credential id) pair that does not exist.
    #[error("credential not found")]
    CredentialNotFound,

    /// A mutating operation was attempted while the registry is paused.
    #[error("registry is paused")]
    ContractPaused,
}

impl RegistryError {
    /// Stable numeric code for hosts that surface integer error codes.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized => 100,
            Self::IdentityExists => 101,
            Self::IdentityNotFound => 102,
            Self::CredentialExists => 103,
            Self::CredentialNotFound => 104,
            Self::ContractPaused => 105,
        }
    }

    /// Machine-readable kind name (e.g. `"IDENTITY_EXISTS"`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::IdentityExists => "IDENTITY_EXISTS",
            Self::IdentityNotFound => "IDENTITY_NOT_FOUND",
            Self::CredentialExists => "CREDENTIAL_EXISTS",
            Self::CredentialNotFound => "CREDENTIAL_NOT_FOUND",
            Self::ContractPaused => "CONTRACT_PAUSED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RegistryError; 6] = [
        RegistryError::NotAuthorized,
        RegistryError::IdentityExists,
        RegistryError::IdentityNotFound,
        RegistryError::CredentialExists,
        RegistryError::CredentialNotFound,
        RegistryError::ContractPaused,
    ];

    #[test]
    fn codes_are_distinct_and_stable() {
        let codes: Vec<u32> = ALL.iter().map(RegistryError::code).collect();
        assert_eq!(codes, vec![100, 101, 102, 103, 104, 105]);
    }

    #[test]
    fn kinds_are_distinct() {
        let mut kinds: Vec<&str> = ALL.iter().map(RegistryError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), ALL.len());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(RegistryError::ContractPaused.to_string(), "registry is paused");
        assert!(RegistryError::NotAuthorized.to_string().contains("not authorized"));
    }
}
