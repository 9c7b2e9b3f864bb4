//! # Registry Snapshots
//!
//! Point-in-time export and import of the complete registry state.
//!
//! A snapshot lists identities sorted by principal and credentials sorted by
//! (subject, credential id), which is the iteration order of the underlying
//! `BTreeMap`s. Two registries with the same contents therefore produce
//! byte-identical JSON and the same [`ContentDigest`].
//!
//! Import re-establishes every registry invariant before a [`Registry`] is
//! built: one identity per principal, one credential per (subject, id), and
//! no credential whose subject lacks an identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vcreg_core::{sha256_digest, ContentDigest, CredentialId, Principal};

use crate::pause::PauseState;
use crate::record::{Credential, CredentialKey, Identity};
use crate::registry::{Registry, RegistryState};

/// Errors building a registry from a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Two identity entries share a principal.
    #[error("duplicate identity for principal {0}")]
    DuplicateIdentity(Principal),

    /// Two credential entries share a (subject, credential id) pair.
    #[error("duplicate credential {0}")]
    DuplicateCredential(CredentialKey),

    /// A credential references a subject with no identity entry.
    #[error("credential {0} references a subject with no identity")]
    OrphanCredential(CredentialKey),

    /// The snapshot digest does not match its contents.
    #[error("snapshot digest mismatch: expected {expected}, computed {actual}")]
    DigestMismatch {
        /// Digest recorded alongside the snapshot.
        expected: String,
        /// Digest computed from the snapshot contents.
        actual: String,
    },

    /// JSON serialization failed.
    #[error("snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An identity with its owning principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEntry {
    /// Owning principal.
    pub principal: Principal,
    /// The stored record.
    pub identity: Identity,
}

/// A credential with its composite key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Subject principal.
    pub subject: Principal,
    /// Identifier, unique per subject.
    pub credential_id: CredentialId,
    /// The stored record.
    pub credential: Credential,
}

/// The complete registry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Fixed registry owner.
    pub owner: Principal,
    /// Pause flag.
    pub paused: bool,
    /// All identities, sorted by principal.
    pub identities: Vec<IdentityEntry>,
    /// All credentials, sorted by subject then credential id.
    pub credentials: Vec<CredentialEntry>,
}

impl RegistrySnapshot {
    /// SHA-256 digest of the snapshot's JSON serialization.
    pub fn digest(&self) -> Result<ContentDigest, SnapshotError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(sha256_digest(&bytes))
    }

    /// Check the snapshot against a previously recorded digest.
    pub fn verify_digest(&self, expected: &ContentDigest) -> Result<(), SnapshotError> {
        let actual = self.digest()?;
        if actual != *expected {
            return Err(SnapshotError::DigestMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }
}

impl Registry {
    /// Export the full registry state under a single read guard.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.read_state();
        RegistrySnapshot {
            owner: self.owner().clone(),
            paused: state.pause.is_paused(),
            identities: state
                .identities
                .iter()
                .map(|(principal, identity)| IdentityEntry {
                    principal: principal.clone(),
                    identity: identity.clone(),
                })
                .collect(),
            credentials: state
                .credentials
                .iter()
                .map(|(key, credential)| CredentialEntry {
                    subject: key.subject.clone(),
                    credential_id: key.credential_id.clone(),
                    credential: credential.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a registry from a snapshot, validating its invariants.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, SnapshotError> {
        let mut identities = BTreeMap::new();
        for entry in snapshot.identities {
            if identities.contains_key(&entry.principal) {
                return Err(SnapshotError::DuplicateIdentity(entry.principal));
            }
            identities.insert(entry.principal, entry.identity);
        }

        let mut credentials = BTreeMap::new();
        for entry in snapshot.credentials {
            let key = CredentialKey::new(entry.subject, entry.credential_id);
            if !identities.contains_key(&key.subject) {
                return Err(SnapshotError::OrphanCredential(key));
            }
            if credentials.contains_key(&key) {
                return Err(SnapshotError::DuplicateCredential(key));
            }
            credentials.insert(key, entry.credential);
        }

        tracing::info!(
            owner = %snapshot.owner,
            identities = identities.len(),
            credentials = credentials.len(),
            paused = snapshot.paused,
            "registry restored from snapshot"
        );

        Ok(Registry::from_parts(
            snapshot.owner,
            RegistryState {
                identities,
                credentials,
                pause: PauseState::from_flag(snapshot.paused),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CallContext;
    use vcreg_core::{BlockHeight, CredentialData, CredentialType, Did, Metadata, PublicKey};

    fn p(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn populated() -> Registry {
        let reg = Registry::new(p("owner"));
        for (who, h) in [("carol", 3), ("alice", 1)] {
            reg.create_identity(
                &CallContext::new(p(who), BlockHeight(h)),
                Did::new(format!("did:ex:{who}")).unwrap(),
                PublicKey::from_bytes([2u8; 33]),
                Metadata::new("m").unwrap(),
            )
            .unwrap();
        }
        for (subject, id, exp) in [("carol", "b", None), ("alice", "z", Some(9)), ("alice", "a", None)] {
            reg.issue_credential(
                &CallContext::new(p("issuer"), BlockHeight(4)),
                p(subject),
                CredentialId::new(id).unwrap(),
                CredentialType::new("kyc").unwrap(),
                CredentialData::new("ok").unwrap(),
                exp.map(BlockHeight),
            )
            .unwrap();
        }
        reg
    }

    #[test]
    fn snapshot_is_sorted() {
        let snap = populated().snapshot();
        let principals: Vec<&str> = snap.identities.iter().map(|e| e.principal.as_str()).collect();
        assert_eq!(principals, vec!["alice", "carol"]);
        let keys: Vec<(&str, &str)> = snap
            .credentials
            .iter()
            .map(|e| (e.subject.as_str(), e.credential_id.as_str()))
            .collect();
        assert_eq!(keys, vec![("alice", "a"), ("alice", "z"), ("carol", "b")]);
    }

    #[test]
    fn restore_preserves_everything() {
        let reg = populated();
        reg.toggle_pause(&p("owner")).unwrap();
        let snap = reg.snapshot();
        let restored = Registry::from_snapshot(snap.clone()).unwrap();
        assert_eq!(restored.owner(), &p("owner"));
        assert!(restored.is_paused());
        assert_eq!(restored.identity_count(), 2);
        assert_eq!(restored.credential_count(), 3);
        assert_eq!(restored.snapshot(), snap);
    }

    #[test]
    fn digest_is_deterministic_and_content_sensitive() {
        let a = populated().snapshot();
        let b = populated().snapshot();
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        let mut c = a.clone();
        c.paused = true;
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
    }

    #[test]
    fn verify_digest_detects_tampering() {
        let snap = populated().snapshot();
        let digest = snap.digest().unwrap();
        snap.verify_digest(&digest).unwrap();
        let mut tampered = snap.clone();
        tampered.credentials[0].credential.issuer = p("mallory");
        assert!(matches!(
            tampered.verify_digest(&digest),
            Err(SnapshotError::DigestMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_identity_rejected() {
        let mut snap = populated().snapshot();
        let dup = snap.identities[0].clone();
        snap.identities.push(dup);
        assert!(matches!(
            Registry::from_snapshot(snap),
            Err(SnapshotError::DuplicateIdentity(_))
        ));
    }

    #[test]
    fn duplicate_credential_rejected() {
        let mut snap = populated().snapshot();
        let dup = snap.credentials[0].clone();
        snap.credentials.push(dup);
        assert!(matches!(
            Registry::from_snapshot(snap),
            Err(SnapshotError::DuplicateCredential(_))
        ));
    }

    #[test]
    fn orphan_credential_rejected() {
        let mut snap = populated().snapshot();
        snap.credentials[0].subject = p("nobody");
        assert!(matches!(
            Registry::from_snapshot(snap),
            Err(SnapshotError::OrphanCredential(_))
        ));
    }

    #[test]
    fn json_roundtrip() {
        let snap = populated().snapshot();
        let json = serde_json::to_string_pretty(&snap).unwrap();
        let parsed: RegistrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snap);
    }
}
