//! # Registry Records
//!
//! The two stored record types and the composite credential key.

use serde::{Deserialize, Serialize};

use vcreg_core::{
    BlockHeight, CredentialData, CredentialId, CredentialType, Did, Metadata, Principal, PublicKey,
};

/// An identity, keyed by its owning principal.
///
/// `did`, `public_key`, and `created_at` are immutable after registration.
/// Only `metadata` changes, and only through the owning principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Caller-supplied decentralized identifier.
    pub did: Did,
    /// Compressed public key.
    pub public_key: PublicKey,
    /// Height at registration.
    pub created_at: BlockHeight,
    /// Mutable metadata.
    pub metadata: Metadata,
}

/// A credential attached to a subject identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Principal that issued the credential; the only one allowed to revoke it.
    pub issuer: Principal,
    /// Category tag.
    pub credential_type: CredentialType,
    /// Opaque payload.
    pub data: CredentialData,
    /// Height at issuance.
    pub issued_at: BlockHeight,
    /// Height from which the credential is no longer valid. `None` never expires.
    pub expires_at: Option<BlockHeight>,
}

impl Credential {
    /// Whether the credential is valid at `height`.
    pub fn is_valid_at(&self, height: BlockHeight) -> bool {
        height.is_before(self.expires_at)
    }
}

/// Composite key: (subject, credential id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CredentialKey {
    /// The identity the credential is attached to.
    pub subject: Principal,
    /// Identifier, unique per subject.
    pub credential_id: CredentialId,
}

impl CredentialKey {
    /// Build a key.
    pub fn new(subject: Principal, credential_id: CredentialId) -> Self {
        Self {
            subject,
            credential_id,
        }
    }
}

impl std::fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.subject, self.credential_id)
    }
}
