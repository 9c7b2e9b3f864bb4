//! # Registry
//!
//! The identity and credential registry. One instance per deployment, owned
//! by the host and passed by reference (typically behind an `Arc`).
//!
//! ## Operations
//!
//! | Operation | Gated by pause | Failure kinds (in check order) |
//! |-----------|----------------|--------------------------------|
//! | `create_identity` | yes | ContractPaused, IdentityExists |
//! | `update_identity_metadata` | yes | ContractPaused, IdentityNotFound |
//! | `issue_credential` | yes | ContractPaused, IdentityNotFound, CredentialExists |
//! | `revoke_credential` | yes | ContractPaused, CredentialNotFound, NotAuthorized |
//! | `toggle_pause` | no | NotAuthorized |
//! | `verify_credential` | no | never fails |
//! | `identity_exists` | no | never fails |
//!
//! ## Issuance Model
//!
//! Any caller may issue a credential to any registered subject. The issuer's
//! own identity is not checked and there is no issuer allow-list; the caller
//! simply becomes the issuer of record, and only that principal may later
//! revoke the credential. Relying parties judge provenance by inspecting
//! `issuer`.
//!
//! ## Expiry
//!
//! Expiry is evaluated lazily on every `verify_credential` call against the
//! height supplied by the host. Expired credentials are hidden from
//! verification but remain stored, and their issuer can still revoke them.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use vcreg_core::{
    BlockHeight, CredentialData, CredentialId, CredentialType, Did, Metadata, Principal, PublicKey,
};

use crate::error::RegistryError;
use crate::pause::PauseState;
use crate::record::{Credential, CredentialKey, Identity};

/// Host-supplied context for a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// The authenticated calling principal.
    pub caller: Principal,
    /// The current block height.
    pub height: BlockHeight,
}

impl CallContext {
    /// Build a context.
    pub fn new(caller: Principal, height: BlockHeight) -> Self {
        Self { caller, height }
    }
}

/// Mutable registry state, guarded as a unit.
#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    pub(crate) identities: BTreeMap<Principal, Identity>,
    pub(crate) credentials: BTreeMap<CredentialKey, Credential>,
    pub(crate) pause: PauseState,
}

impl RegistryState {
    /// Reject mutations while paused.
    fn require_active(&self) -> Result<(), RegistryError> {
        if self.pause.is_paused() {
            return Err(RegistryError::ContractPaused);
        }
        Ok(())
    }

    fn insert_identity(&mut self, ctx: &CallContext, identity: Identity) -> Result<(), RegistryError> {
        self.require_active()?;
        if self.identities.contains_key(&ctx.caller) {
            return Err(RegistryError::IdentityExists);
        }
        self.identities.insert(ctx.caller.clone(), identity);
        Ok(())
    }

    fn replace_metadata(&mut self, ctx: &CallContext, metadata: Metadata) -> Result<(), RegistryError> {
        self.require_active()?;
        let identity = self
            .identities
            .get_mut(&ctx.caller)
            .ok_or(RegistryError::IdentityNotFound)?;
        identity.metadata = metadata;
        Ok(())
    }

    fn insert_credential(
        &mut self,
        key: &CredentialKey,
        credential: Credential,
    ) -> Result<(), RegistryError> {
        self.require_active()?;
        if !self.identities.contains_key(&key.subject) {
            return Err(RegistryError::IdentityNotFound);
        }
        if self.credentials.contains_key(key) {
            return Err(RegistryError::CredentialExists);
        }
        self.credentials.insert(key.clone(), credential);
        Ok(())
    }

    fn remove_credential(&mut self, ctx: &CallContext, key: &CredentialKey) -> Result<(), RegistryError> {
        self.require_active()?;
        let credential = self
            .credentials
            .get(key)
            .ok_or(RegistryError::CredentialNotFound)?;
        if credential.issuer != ctx.caller {
            return Err(RegistryError::NotAuthorized);
        }
        self.credentials.remove(key);
        Ok(())
    }
}

/// The identity and credential registry.
#[derive(Debug)]
pub struct Registry {
    owner: Principal,
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Initialize an empty, unpaused registry owned by `owner`.
    ///
    /// The owner is fixed for the registry's lifetime.
    pub fn new(owner: Principal) -> Self {
        tracing::info!(owner = %owner, "registry initialized");
        Self {
            owner,
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub(crate) fn from_parts(owner: Principal, state: RegistryState) -> Self {
        Self {
            owner,
            state: RwLock::new(state),
        }
    }

    pub(crate) fn read_state(&self) -> parking_lot::RwLockReadGuard<'_, RegistryState> {
        self.state.read()
    }

    // ── Identity ─────────────────────────────────────────────────────

    /// Register an identity for the calling principal.
    ///
    /// `created_at` is stamped with the context height.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ContractPaused`], then [`RegistryError::IdentityExists`]
    /// if the caller already has an identity. The existing record is left
    /// untouched on failure.
    pub fn create_identity(
        &self,
        ctx: &CallContext,
        did: Did,
        public_key: PublicKey,
        metadata: Metadata,
    ) -> Result<(), RegistryError> {
        let identity = Identity {
            did,
            public_key,
            created_at: ctx.height,
            metadata,
        };
        let result = self.state.write().insert_identity(ctx, identity);
        log_outcome("create_identity", ctx, &result);
        result
    }

    /// Replace the calling principal's identity metadata.
    ///
    /// All other identity fields are untouched. Calling twice with the same
    /// value is a no-op the second time.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ContractPaused`], then [`RegistryError::IdentityNotFound`].
    pub fn update_identity_metadata(
        &self,
        ctx: &CallContext,
        metadata: Metadata,
    ) -> Result<(), RegistryError> {
        let result = self.state.write().replace_metadata(ctx, metadata);
        log_outcome("update_identity_metadata", ctx, &result);
        result
    }

    /// Whether `principal` has a registered identity.
    pub fn identity_exists(&self, principal: &Principal) -> bool {
        self.state.read().identities.contains_key(principal)
    }

    /// The identity registered for `principal`, if any.
    pub fn get_identity(&self, principal: &Principal) -> Option<Identity> {
        self.state.read().identities.get(principal).cloned()
    }

    // ── Credentials ──────────────────────────────────────────────────

    /// Issue a credential to `subject`, with the caller as issuer of record.
    ///
    /// `issued_at` is stamped with the context height. An `expires_at` at or
    /// below the current height is accepted; such a credential is stored but
    /// never verifies.
    ///
    /// # Errors
    ///
    /// In order: [`RegistryError::ContractPaused`],
    /// [`RegistryError::IdentityNotFound`] if the subject has no identity,
    /// [`RegistryError::CredentialExists`] if the pair is taken.
    pub fn issue_credential(
        &self,
        ctx: &CallContext,
        subject: Principal,
        credential_id: CredentialId,
        credential_type: CredentialType,
        data: CredentialData,
        expires_at: Option<BlockHeight>,
    ) -> Result<(), RegistryError> {
        let key = CredentialKey::new(subject, credential_id);
        let credential = Credential {
            issuer: ctx.caller.clone(),
            credential_type,
            data,
            issued_at: ctx.height,
            expires_at,
        };
        let result = self.state.write().insert_credential(&key, credential);
        match &result {
            Ok(()) => tracing::info!(
                op = "issue_credential",
                issuer = %ctx.caller,
                credential = %key,
                height = %ctx.height,
                expires_at = ?expires_at.map(|h| h.value()),
                "credential issued"
            ),
            Err(e) => tracing::warn!(
                op = "issue_credential",
                issuer = %ctx.caller,
                credential = %key,
                error = e.kind(),
                "credential issuance rejected"
            ),
        }
        result
    }

    /// Look up a credential and return it only if it is still valid at `height`.
    ///
    /// Returns `None` both when the credential does not exist and when it has
    /// expired (`height >= expires_at`). Never mutates, never fails, and is
    /// available while paused.
    pub fn verify_credential(
        &self,
        subject: &Principal,
        credential_id: &CredentialId,
        height: BlockHeight,
    ) -> Option<Credential> {
        let key = CredentialKey::new(subject.clone(), credential_id.clone());
        self.state
            .read()
            .credentials
            .get(&key)
            .filter(|c| c.is_valid_at(height))
            .cloned()
    }

    /// The stored credential record regardless of expiry.
    pub fn credential_record(
        &self,
        subject: &Principal,
        credential_id: &CredentialId,
    ) -> Option<Credential> {
        let key = CredentialKey::new(subject.clone(), credential_id.clone());
        self.state.read().credentials.get(&key).cloned()
    }

    /// Permanently delete a credential. Only its issuer may do so.
    ///
    /// Expired credentials can still be revoked.
    ///
    /// # Errors
    ///
    /// In order: [`RegistryError::ContractPaused`],
    /// [`RegistryError::CredentialNotFound`], [`RegistryError::NotAuthorized`]
    /// if the caller is not the issuer (the subject included).
    pub fn revoke_credential(
        &self,
        ctx: &CallContext,
        subject: &Principal,
        credential_id: &CredentialId,
    ) -> Result<(), RegistryError> {
        let key = CredentialKey::new(subject.clone(), credential_id.clone());
        let result = self.state.write().remove_credential(ctx, &key);
        match &result {
            Ok(()) => tracing::info!(
                op = "revoke_credential",
                issuer = %ctx.caller,
                credential = %key,
                height = %ctx.height,
                "credential revoked"
            ),
            Err(e) => tracing::warn!(
                op = "revoke_credential",
                caller = %ctx.caller,
                credential = %key,
                error = e.kind(),
                "credential revocation rejected"
            ),
        }
        result
    }

    // ── Pause ────────────────────────────────────────────────────────

    /// Flip the pause flag and return its new value. Owner only.
    ///
    /// Not itself pause-gated, so the owner can always resume.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotAuthorized`] for any caller other than the owner;
    /// the flag is left unchanged.
    pub fn toggle_pause(&self, caller: &Principal) -> Result<bool, RegistryError> {
        if *caller != self.owner {
            tracing::warn!(op = "toggle_pause", caller = %caller, "pause toggle rejected: not owner");
            return Err(RegistryError::NotAuthorized);
        }
        let mut state = self.state.write();
        state.pause = state.pause.toggled();
        let paused = state.pause.is_paused();
        drop(state);
        tracing::info!(op = "toggle_pause", paused, "pause state changed");
        Ok(paused)
    }

    /// Whether mutations are currently rejected.
    pub fn is_paused(&self) -> bool {
        self.state.read().pause.is_paused()
    }

    /// Current pause state.
    pub fn pause_state(&self) -> PauseState {
        self.state.read().pause
    }

    /// The fixed registry owner.
    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Number of registered identities.
    pub fn identity_count(&self) -> usize {
        self.state.read().identities.len()
    }

    /// Number of stored credentials, including expired ones.
    pub fn credential_count(&self) -> usize {
        self.state.read().credentials.len()
    }
}

/// Emit the structured log line for an identity mutation.
fn log_outcome(op: &'static str, ctx: &CallContext, result: &Result<(), RegistryError>) {
    match result {
        Ok(()) => tracing::info!(op, caller = %ctx.caller, height = %ctx.height, "identity updated"),
        Err(e) => tracing::warn!(op, caller = %ctx.caller, error = e.kind(), "identity operation rejected"),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
